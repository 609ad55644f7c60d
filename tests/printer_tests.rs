use sqltree::ast::{AstPrint, Statement, Token};
use sqltree::parse_tree::{ParseChild, ParseTree, Production};
use sqltree::transform::transform_statement;

fn ident(name: &str) -> ParseChild {
    ParseTree::leaf(Token::identifier(name, 1))
}

fn table_name(name: &str) -> ParseChild {
    ParseTree::branch(Production::TableName, vec![ident(name)])
}

fn column_def(name: &str, ty: &str, modifier: Option<Production>) -> ParseChild {
    let mut children = vec![
        ParseTree::branch(Production::ColumnName, vec![ident(name)]),
        ParseTree::branch(Production::Datatype, vec![ident(ty)]),
    ];
    if let Some(rule) = modifier {
        children.push(ParseTree::branch(rule, vec![]));
    }
    ParseTree::branch(Production::ColumnDef, children)
}

fn create_stmnt() -> Statement {
    let tree = ParseTree::new(
        Production::CreateStmnt,
        vec![
            table_name("foo"),
            ParseTree::branch(
                Production::ColumnDefList,
                vec![
                    column_def("id", "integer", Some(Production::PrimaryKey)),
                    column_def("name", "text", None),
                ],
            ),
        ],
    );
    transform_statement(tree).unwrap()
}

fn select_stmnt(with_from: bool) -> Statement {
    let mut children = vec![ParseTree::branch(
        Production::SelectClause,
        vec![
            ParseTree::branch(
                Production::Selectable,
                vec![ParseTree::branch(Production::ColumnRef, vec![ident("cola")])],
            ),
            ParseTree::branch(
                Production::Selectable,
                vec![ParseTree::branch(Production::ColumnRef, vec![ident("colb")])],
            ),
        ],
    )];
    if with_from {
        children.push(ParseTree::branch(
            Production::FromClause,
            vec![table_name("foo")],
        ));
    }
    transform_statement(ParseTree::new(Production::SelectStmnt, children)).unwrap()
}

#[test]
fn test_create_prettyprint_structure() {
    let stmnt = create_stmnt();
    let lines = stmnt.prettyprint(0);
    assert_eq!(
        lines,
        vec![
            "CreateStmnt:",
            "  TableName:",
            "    foo",
            "  ColumnDef:",
            "    ColumnName:",
            "      id",
            "    Integer",
            "    true",
            "    true",
            "  ColumnDef:",
            "    ColumnName:",
            "      name",
            "    Text",
            "    false",
            "    false",
        ]
    );
}

#[test]
fn test_prettyprint_is_deterministic() {
    let stmnt = create_stmnt();
    assert_eq!(stmnt.prettyprint(0), stmnt.prettyprint(0));
    let stmnt = select_stmnt(true);
    assert_eq!(stmnt.prettyprint(0), stmnt.prettyprint(0));
}

#[test]
fn test_prettyprint_respects_starting_depth() {
    let stmnt = create_stmnt();
    let at_zero = stmnt.prettyprint(0);
    let at_two = stmnt.prettyprint(2);
    assert_eq!(at_zero.len(), at_two.len());
    for (zero, two) in at_zero.iter().zip(&at_two) {
        assert_eq!(&format!("    {}", zero), two);
    }
}

#[test]
fn test_virtual_select_clause_emits_no_header() {
    // The select clause is virtual: its items print at the statement's
    // child depth, with no SelectClause header line between them.
    let stmnt = select_stmnt(false);
    let lines = stmnt.prettyprint(0);
    assert_eq!(
        lines,
        vec![
            "SelectStmnt:",
            "  Selectable:",
            "    cola",
            "  Selectable:",
            "    colb",
        ]
    );
    assert!(!lines.iter().any(|line| line.contains("SelectClause")));
}

#[test]
fn test_absent_optional_fields_print_nothing() {
    let without_from = select_stmnt(false).prettyprint(0);
    let with_from = select_stmnt(true).prettyprint(0);
    assert!(without_from.len() < with_from.len());
    assert!(!without_from.iter().any(|line| line.contains("null")));
    assert!(with_from.iter().any(|line| line.contains("FromClause:")));
}

#[test]
fn test_unmodeled_clause_prints_its_subtree() {
    let tree = ParseTree::new(
        Production::SelectStmnt,
        vec![
            ParseTree::branch(
                Production::SelectClause,
                vec![ParseTree::branch(
                    Production::Selectable,
                    vec![ParseTree::branch(Production::ColumnRef, vec![ident("cola")])],
                )],
            ),
            ParseTree::branch(
                Production::FromClause,
                vec![
                    table_name("foo"),
                    ParseTree::branch(
                        Production::WhereClause,
                        vec![ParseTree::branch(Production::Condition, vec![ident("cola")])],
                    ),
                ],
            ),
        ],
    );
    let stmnt = transform_statement(tree).unwrap();
    let lines = stmnt.prettyprint(0);
    assert_eq!(
        lines,
        vec![
            "SelectStmnt:",
            "  Selectable:",
            "    cola",
            "  FromClause:",
            "    TableName:",
            "      foo",
            "    WhereClause:",
            "      condition",
            "        Identifier[cola]",
        ]
    );
}

#[test]
fn test_joining_lines_reproduces_the_tree() {
    let stmnt = create_stmnt();
    let dump = stmnt.prettyprint(0).join("\n");
    assert!(dump.starts_with("CreateStmnt:\n"));
    assert!(dump.contains("\n  TableName:\n    foo\n"));
}
