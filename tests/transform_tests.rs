use sqltree::ast::{DataType, SelectableAtom, SelectableItem, Statement, Token};
use sqltree::parse_tree::{ParseChild, ParseTree, Production};
use sqltree::transform::{TransformError, transform, transform_statement};
use sqltree::value::Value;

// Helper functions to build parse trees the way the external parser would.

fn ident(name: &str) -> ParseChild {
    ParseTree::leaf(Token::identifier(name, 1))
}

fn number(lexeme: &str) -> ParseChild {
    ParseTree::leaf(Token::number(lexeme, 1).unwrap())
}

fn string(text: &str) -> ParseChild {
    ParseTree::leaf(Token::string(text, 1))
}

fn table_name(name: &str) -> ParseChild {
    ParseTree::branch(Production::TableName, vec![ident(name)])
}

fn column_name(name: &str) -> ParseChild {
    ParseTree::branch(Production::ColumnName, vec![ident(name)])
}

fn datatype(name: &str) -> ParseChild {
    ParseTree::branch(Production::Datatype, vec![ident(name)])
}

fn column_def(name: &str, ty: &str, modifier: Option<Production>) -> ParseChild {
    let mut children = vec![column_name(name), datatype(ty)];
    if let Some(rule) = modifier {
        children.push(ParseTree::branch(rule, vec![]));
    }
    ParseTree::branch(Production::ColumnDef, children)
}

fn create_table(table: &str, columns: Vec<ParseChild>) -> ParseTree {
    ParseTree::new(
        Production::CreateStmnt,
        vec![
            table_name(table),
            ParseTree::branch(Production::ColumnDefList, columns),
        ],
    )
}

fn column_ref(name: &str) -> ParseChild {
    ParseTree::branch(Production::ColumnRef, vec![ident(name)])
}

fn selectable(atom: ParseChild) -> ParseChild {
    ParseTree::branch(Production::Selectable, vec![atom])
}

fn select_clause(items: Vec<ParseChild>) -> ParseChild {
    ParseTree::branch(Production::SelectClause, items)
}

fn condition() -> ParseChild {
    // Condition grammar is unmodeled; any subtree shape is carried as-is.
    ParseTree::branch(Production::Condition, vec![ident("cola")])
}

fn where_clause() -> ParseChild {
    ParseTree::branch(Production::WhereClause, vec![condition()])
}

// ============================================================================
// Create-table statements
// ============================================================================

#[test]
fn test_create_table_with_one_primary_key() {
    // create table foo (id integer primary key, name text)
    let tree = create_table(
        "foo",
        vec![
            column_def("id", "integer", Some(Production::PrimaryKey)),
            column_def("name", "text", None),
        ],
    );

    let stmnt = transform_statement(tree).unwrap();
    let create = match stmnt {
        Statement::Create(create) => create,
        other => panic!("expected a create statement, got {:?}", other),
    };

    assert_eq!(create.table_name.name, "foo");
    assert_eq!(create.columns.len(), 2);
    assert_eq!(create.columns[0].column_name.name, "id");
    assert_eq!(create.columns[0].datatype, DataType::Integer);
    assert!(create.columns[0].is_primary_key);
    assert_eq!(create.columns[1].column_name.name, "name");
    assert_eq!(create.columns[1].datatype, DataType::Text);
    assert!(!create.columns[1].is_primary_key);
}

#[test]
fn test_create_table_without_primary_key_reports_zero() {
    let tree = create_table("foo", vec![column_def("id", "integer", None)]);
    let err = transform_statement(tree).unwrap_err();
    assert_eq!(err, TransformError::ConstraintViolation { count: 0 });
    assert!(!err.is_internal());
}

#[test]
fn test_create_table_with_two_primary_keys_reports_two() {
    // create table t (a integer, b integer primary key, c integer primary key)
    let tree = create_table(
        "t",
        vec![
            column_def("a", "integer", None),
            column_def("b", "integer", Some(Production::PrimaryKey)),
            column_def("c", "integer", Some(Production::PrimaryKey)),
        ],
    );
    let err = transform_statement(tree).unwrap_err();
    assert_eq!(err, TransformError::ConstraintViolation { count: 2 });
}

#[test]
fn test_datatype_mapping_is_case_insensitive() {
    for name in ["INTEGER", "Integer", "integer", "InTeGeR"] {
        let tree = create_table("t", vec![column_def("a", name, Some(Production::PrimaryKey))]);
        let stmnt = transform_statement(tree).unwrap();
        let Statement::Create(create) = stmnt else {
            panic!("expected a create statement");
        };
        assert_eq!(create.columns[0].datatype, DataType::Integer);
    }
}

#[test]
fn test_all_four_datatypes_map() {
    for (name, expected) in [
        ("integer", DataType::Integer),
        ("real", DataType::Real),
        ("text", DataType::Text),
        ("blob", DataType::Blob),
    ] {
        let tree = create_table("t", vec![column_def("a", name, Some(Production::PrimaryKey))]);
        let Statement::Create(create) = transform_statement(tree).unwrap() else {
            panic!("expected a create statement");
        };
        assert_eq!(create.columns[0].datatype, expected);
    }
}

#[test]
fn test_unrecognized_datatype_names_the_lexeme() {
    let tree = create_table("t", vec![column_def("a", "varchar", None)]);
    let err = transform_statement(tree).unwrap_err();
    assert_eq!(
        err,
        TransformError::UnrecognizedDatatype {
            lexeme: "varchar".to_string()
        }
    );
    assert_eq!(err.to_string(), "unrecognized datatype [varchar]");
    assert!(!err.is_internal());
}

#[test]
fn test_not_null_column_reports_nullable() {
    // Pins the current polarity: both modifiers yield is_nullable = true.
    let tree = create_table(
        "t",
        vec![
            column_def("a", "integer", Some(Production::PrimaryKey)),
            column_def("b", "text", Some(Production::NotNull)),
            column_def("c", "text", None),
        ],
    );
    let Statement::Create(create) = transform_statement(tree).unwrap() else {
        panic!("expected a create statement");
    };
    assert!(create.columns[0].is_nullable);
    assert!(create.columns[1].is_nullable);
    assert!(!create.columns[1].is_primary_key);
    assert!(!create.columns[2].is_nullable);
}

// ============================================================================
// Select statements
// ============================================================================

#[test]
fn test_select_with_columns_and_from() {
    // select cola, colb from foo
    let tree = ParseTree::new(
        Production::SelectStmnt,
        vec![
            select_clause(vec![
                selectable(column_ref("cola")),
                selectable(column_ref("colb")),
            ]),
            ParseTree::branch(Production::FromClause, vec![table_name("foo")]),
        ],
    );

    let Statement::Select(select) = transform_statement(tree).unwrap() else {
        panic!("expected a select statement");
    };
    assert_eq!(select.select_clause.items.len(), 2);
    let from = select.from_clause.unwrap();
    assert_eq!(from.source.name, "foo");
    assert!(from.where_clause.is_none());
    assert!(select.group_by_clause.is_none());
    assert!(select.limit_clause.is_none());
}

#[test]
fn test_select_literal_and_function_call_items() {
    // select 1, upper(name) from people
    let tree = ParseTree::new(
        Production::SelectStmnt,
        vec![
            select_clause(vec![
                selectable(ParseTree::branch(
                    Production::Primary,
                    vec![ParseTree::branch(Production::Literal, vec![number("1")])],
                )),
                selectable(ParseTree::branch(
                    Production::FuncCall,
                    vec![
                        ident("upper"),
                        ParseTree::branch(Production::FuncArgList, vec![column_ref("name")]),
                    ],
                )),
            ]),
            ParseTree::branch(Production::FromClause, vec![table_name("people")]),
        ],
    );

    let Statement::Select(select) = transform_statement(tree).unwrap() else {
        panic!("expected a select statement");
    };
    assert_eq!(
        select.select_clause.items[0].item,
        SelectableItem::Atom(SelectableAtom::Literal {
            value: Value::Integer(1)
        })
    );
    assert_eq!(
        select.select_clause.items[1].item,
        SelectableItem::FuncCall {
            name: "upper".to_string(),
            args: vec![SelectableAtom::ColumnRef {
                name: "name".to_string()
            }],
        }
    );
}

#[test]
fn test_select_carries_unmodeled_tail_clauses_verbatim() {
    let group_by = ParseTree::branch(Production::GroupByClause, vec![ident("cola")]);
    let limit = ParseTree::branch(Production::LimitClause, vec![number("10")]);
    let tree = ParseTree::new(
        Production::SelectStmnt,
        vec![
            select_clause(vec![selectable(column_ref("cola"))]),
            ParseTree::branch(Production::FromClause, vec![table_name("foo"), where_clause()]),
            group_by.clone(),
            limit.clone(),
        ],
    );

    let Statement::Select(select) = transform_statement(tree).unwrap() else {
        panic!("expected a select statement");
    };
    let from = select.from_clause.unwrap();
    let carried = from.where_clause.unwrap().condition;
    assert_eq!(carried.production, Production::Condition);

    let group_by_clause = select.group_by_clause.unwrap();
    assert_eq!(ParseChild::Tree(group_by_clause.tree), group_by);
    let limit_clause = select.limit_clause.unwrap();
    assert_eq!(ParseChild::Tree(limit_clause.tree), limit);
    assert!(select.having_clause.is_none());
    assert!(select.order_by_clause.is_none());
}

// ============================================================================
// Insert, update, delete, drop
// ============================================================================

#[test]
fn test_insert_statement() {
    // insert into table_name (col_a, col_b) values (11, 'val_b')
    let tree = ParseTree::new(
        Production::InsertStmnt,
        vec![
            table_name("table_name"),
            ParseTree::branch(
                Production::ColumnNameList,
                vec![column_name("col_a"), column_name("col_b")],
            ),
            ParseTree::branch(
                Production::ValueList,
                vec![
                    ParseTree::branch(Production::Literal, vec![number("11")]),
                    ParseTree::branch(Production::Literal, vec![string("val_b")]),
                ],
            ),
        ],
    );

    let Statement::Insert(insert) = transform_statement(tree).unwrap() else {
        panic!("expected an insert statement");
    };
    assert_eq!(insert.table_name.name, "table_name");
    assert_eq!(insert.columns.len(), 2);
    assert_eq!(insert.columns[1].name, "col_b");
    assert_eq!(
        insert.values,
        vec![Value::Integer(11), Value::Text("val_b".to_string())]
    );
}

#[test]
fn test_update_statement_with_where() {
    // update table_name set column_name = 'value' where foo = 'bar'
    let tree = ParseTree::new(
        Production::UpdateStmnt,
        vec![
            table_name("table_name"),
            ParseTree::branch(
                Production::Assignment,
                vec![
                    column_name("column_name"),
                    ParseTree::branch(Production::Literal, vec![string("value")]),
                ],
            ),
            where_clause(),
        ],
    );

    let Statement::Update(update) = transform_statement(tree).unwrap() else {
        panic!("expected an update statement");
    };
    assert_eq!(update.table_name.name, "table_name");
    assert_eq!(update.assignments.len(), 1);
    assert_eq!(update.assignments[0].column.name, "column_name");
    assert_eq!(update.assignments[0].value, Value::Text("value".to_string()));
    assert!(update.where_clause.is_some());
}

#[test]
fn test_delete_statement() {
    // delete from table_foo where ...
    let tree = ParseTree::new(
        Production::DeleteStmnt,
        vec![ParseTree::branch(
            Production::FromClause,
            vec![table_name("table_foo"), where_clause()],
        )],
    );

    let Statement::Delete(delete) = transform_statement(tree).unwrap() else {
        panic!("expected a delete statement");
    };
    assert_eq!(delete.from_clause.source.name, "table_foo");
    assert!(delete.from_clause.where_clause.is_some());
}

#[test]
fn test_drop_statement() {
    let tree = ParseTree::new(Production::DropStmnt, vec![table_name("foo")]);
    let Statement::Drop(drop) = transform_statement(tree).unwrap() else {
        panic!("expected a drop statement");
    };
    assert_eq!(drop.table_name.name, "foo");
}

// ============================================================================
// Programs
// ============================================================================

#[test]
fn test_program_of_statements() {
    let create = create_table(
        "foo",
        vec![column_def("id", "integer", Some(Production::PrimaryKey))],
    );
    let drop = ParseTree::new(Production::DropStmnt, vec![table_name("foo")]);
    let tree = ParseTree::new(
        Production::Program,
        vec![ParseChild::Tree(create), ParseChild::Tree(drop)],
    );

    let program = transform(tree).unwrap();
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(program.statements[0], Statement::Create(_)));
    assert!(matches!(program.statements[1], Statement::Drop(_)));
}

#[test]
fn test_transform_requires_a_program_root() {
    let tree = create_table(
        "foo",
        vec![column_def("id", "integer", Some(Production::PrimaryKey))],
    );
    let err = transform(tree).unwrap_err();
    assert!(matches!(err, TransformError::Skew { .. }));
}

// ============================================================================
// Unsupported constructs and internal skew
// ============================================================================

#[test]
fn test_truncate_is_not_supported() {
    let tree = ParseTree::new(Production::TruncateStmnt, vec![table_name("foo")]);
    let err = transform_statement(tree).unwrap_err();
    assert_eq!(
        err,
        TransformError::Unsupported {
            production: Production::TruncateStmnt
        }
    );
    assert_eq!(err.to_string(), "construct not supported: truncate_stmnt");
    assert!(err.is_internal());
}

#[test]
fn test_joined_source_is_not_supported() {
    // select cola from foo join bar on ... surfaces the join-source stub.
    let tree = ParseTree::new(
        Production::SelectStmnt,
        vec![
            select_clause(vec![selectable(column_ref("cola"))]),
            ParseTree::branch(
                Production::FromClause,
                vec![ParseTree::branch(
                    Production::JoinSource,
                    vec![table_name("foo"), table_name("bar")],
                )],
            ),
        ],
    );
    let err = transform_statement(tree).unwrap_err();
    assert_eq!(
        err,
        TransformError::Unsupported {
            production: Production::JoinSource
        }
    );
}

#[test]
fn test_malformed_children_are_internal_skew() {
    // primary_key takes no children; handing it one is grammar skew,
    // never bad user input.
    let tree = create_table(
        "t",
        vec![ParseTree::branch(
            Production::ColumnDef,
            vec![
                column_name("a"),
                datatype("integer"),
                ParseTree::branch(Production::PrimaryKey, vec![ident("stray")]),
            ],
        )],
    );
    let err = transform_statement(tree).unwrap_err();
    assert!(matches!(
        err,
        TransformError::Skew {
            production: Production::PrimaryKey,
            ..
        }
    ));
    assert!(err.is_internal());
}

#[test]
fn test_column_def_rejects_two_modifiers() {
    let tree = create_table(
        "t",
        vec![ParseTree::branch(
            Production::ColumnDef,
            vec![
                column_name("a"),
                datatype("integer"),
                ParseTree::branch(Production::PrimaryKey, vec![]),
                ParseTree::branch(Production::NotNull, vec![]),
            ],
        )],
    );
    let err = transform_statement(tree).unwrap_err();
    assert!(matches!(err, TransformError::Skew { .. }));
}

#[test]
fn test_invalid_create_aborts_before_later_columns() {
    // The bad datatype fails the whole statement; no partial node escapes.
    let tree = create_table(
        "t",
        vec![
            column_def("a", "varchar", Some(Production::PrimaryKey)),
            column_def("b", "integer", None),
        ],
    );
    assert!(transform_statement(tree).is_err());
}

#[test]
fn test_modifier_enum_is_positional() {
    // A lone modifier production resolves to its enum, consumed
    // positionally by column_def; primary key and not null map apart.
    let tree = create_table(
        "t",
        vec![
            column_def("a", "integer", Some(Production::PrimaryKey)),
            column_def("b", "integer", Some(Production::NotNull)),
        ],
    );
    let Statement::Create(create) = transform_statement(tree).unwrap() else {
        panic!("expected a create statement");
    };
    assert!(create.columns[0].is_primary_key);
    assert!(!create.columns[1].is_primary_key);
}
