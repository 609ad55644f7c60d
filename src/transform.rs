//! Bottom-up transformation of a parse tree into the typed AST.
//!
//! Dispatch is one closed `match` over [`Production`]: every reachable rule
//! has exactly one handler arm, invoked after the rule's children have
//! already been converted (the pre-destructured-children contract).
//! Grouping rules are spliced into their parent's argument list; unmodeled
//! rules are captured verbatim without recursion; rules without a finished
//! handler fail with a distinguishable unsupported-construct error.

use std::fmt;

use crate::ast::clauses::{
    FromClause, SelectClause, Selectable, SelectableAtom, SelectableItem, UnmodeledClause,
    WhereClause,
};
use crate::ast::statements::{
    Assignment, ColumnDef, ColumnModifier, ColumnName, ConstraintViolation, CreateStmnt,
    DataType, DeleteStmnt, DropStmnt, InsertStmnt, Program, SelectStmnt, Statement, TableName,
    UpdateStmnt,
};
use crate::ast::tokens::{Token, TokenType};
use crate::parse_tree::{ParseChild, ParseTree, Production};
use crate::value::Value;

/// Errors that can occur while transforming a parse tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A datatype token outside the closed set; carries the offending
    /// lexeme. User-facing.
    UnrecognizedDatatype { lexeme: String },

    /// Create-table primary-key count was not exactly one. User-facing.
    ConstraintViolation { count: usize },

    /// A recognized production whose handler is not finished. Internal
    /// configuration error, distinct from bad input.
    Unsupported { production: Production },

    /// A production's children did not match its handler's expectation.
    /// Internal grammar/transformer skew, never bad user input.
    Skew {
        production: Production,
        detail: String,
    },
}

impl TransformError {
    /// Whether the error marks an internal invariant violation rather
    /// than a problem with the user's statement.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            TransformError::Unsupported { .. } | TransformError::Skew { .. }
        )
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::UnrecognizedDatatype { lexeme } => {
                write!(f, "unrecognized datatype [{}]", lexeme)
            }
            TransformError::ConstraintViolation { count } => {
                write!(f, "expected 1 primary key, received {}", count)
            }
            TransformError::Unsupported { production } => {
                write!(f, "construct not supported: {}", production.rule_name())
            }
            TransformError::Skew { production, detail } => {
                write!(
                    f,
                    "grammar/transformer skew at {}: {}",
                    production.rule_name(),
                    detail
                )
            }
        }
    }
}

impl std::error::Error for TransformError {}

impl From<ConstraintViolation> for TransformError {
    fn from(violation: ConstraintViolation) -> Self {
        TransformError::ConstraintViolation {
            count: violation.count,
        }
    }
}

fn skew(production: Production, detail: impl Into<String>) -> TransformError {
    TransformError::Skew {
        production,
        detail: detail.into(),
    }
}

/// Intermediate value produced by a handler while the walk is in flight:
/// a constructed node, a resolved enumeration, a token leaf, or a raw
/// subtree captured verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
    Token(Token),
    Raw(ParseTree),
    Program(Program),
    Stmnt(Statement),
    TableName(TableName),
    ColumnName(ColumnName),
    ColumnDef(ColumnDef),
    Datatype(DataType),
    Modifier(ColumnModifier),
    SelectClause(SelectClause),
    Selectable(Selectable),
    Item(SelectableItem),
    Atom(SelectableAtom),
    FromClause(FromClause),
    WhereClause(WhereClause),
    Assignment(Assignment),
}

impl Transformed {
    fn kind_name(&self) -> &'static str {
        match self {
            Transformed::Token(_) => "token",
            Transformed::Raw(_) => "raw subtree",
            Transformed::Program(_) => "program",
            Transformed::Stmnt(_) => "statement",
            Transformed::TableName(_) => "table name",
            Transformed::ColumnName(_) => "column name",
            Transformed::ColumnDef(_) => "column definition",
            Transformed::Datatype(_) => "datatype",
            Transformed::Modifier(_) => "column modifier",
            Transformed::SelectClause(_) => "select clause",
            Transformed::Selectable(_) => "selectable",
            Transformed::Item(_) => "selectable item",
            Transformed::Atom(_) => "selectable atom",
            Transformed::FromClause(_) => "from clause",
            Transformed::WhereClause(_) => "where clause",
            Transformed::Assignment(_) => "assignment",
        }
    }
}

/// Transform a whole parse tree rooted at the `program` rule.
///
/// The tree is consumed; unmodeled subtrees move into the AST verbatim,
/// everything else is dropped once converted.
pub fn transform(tree: ParseTree) -> Result<Program, TransformError> {
    let production = tree.production;
    let mut results = transform_node(tree)?;
    match (results.pop(), results.is_empty()) {
        (Some(Transformed::Program(program)), true) => Ok(program),
        _ => Err(skew(production, "expected a program at the root")),
    }
}

/// Transform a parse tree rooted at a single statement rule.
pub fn transform_statement(tree: ParseTree) -> Result<Statement, TransformError> {
    let production = tree.production;
    let mut results = transform_node(tree)?;
    match (results.pop(), results.is_empty()) {
        (Some(Transformed::Stmnt(stmnt)), true) => Ok(stmnt),
        _ => Err(skew(production, "expected a statement at the root")),
    }
}

fn transform_node(tree: ParseTree) -> Result<Vec<Transformed>, TransformError> {
    // Unmodeled rules keep their subtree; no recursion.
    if tree.production.is_unmodeled() {
        return Ok(vec![Transformed::Raw(tree)]);
    }

    let production = tree.production;
    let mut args = Vec::with_capacity(tree.children.len());
    for child in tree.children {
        match child {
            ParseChild::Token(token) => args.push(Transformed::Token(token)),
            ParseChild::Tree(sub) => args.extend(transform_node(sub)?),
        }
    }
    apply(production, args)
}

/// One handler per production, over its already-converted children.
fn apply(
    production: Production,
    args: Vec<Transformed>,
) -> Result<Vec<Transformed>, TransformError> {
    // Grouping rules are transparent: splice the children upward.
    if production.is_grouping() {
        return Ok(args);
    }

    let single = |value: Transformed| Ok(vec![value]);

    match production {
        Production::Program => {
            let mut statements = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Transformed::Stmnt(stmnt) => statements.push(stmnt),
                    other => {
                        return Err(skew(
                            production,
                            format!("expected a statement, received {}", other.kind_name()),
                        ));
                    }
                }
            }
            single(Transformed::Program(Program::new(statements)))
        }

        Production::CreateStmnt => {
            let mut iter = args.into_iter();
            let table_name = match iter.next() {
                Some(Transformed::TableName(name)) => name,
                _ => return Err(skew(production, "expected a table name first")),
            };
            let mut columns = Vec::new();
            for arg in iter {
                match arg {
                    Transformed::ColumnDef(def) => columns.push(def),
                    other => {
                        return Err(skew(
                            production,
                            format!(
                                "expected a column definition, received {}",
                                other.kind_name()
                            ),
                        ));
                    }
                }
            }
            let stmnt = CreateStmnt::new(table_name, columns)?;
            single(Transformed::Stmnt(Statement::Create(stmnt)))
        }

        Production::SelectStmnt => {
            let mut iter = args.into_iter();
            let select_clause = match iter.next() {
                Some(Transformed::SelectClause(clause)) => clause,
                _ => return Err(skew(production, "expected a select clause first")),
            };
            let mut from_clause = None;
            let mut group_by_clause = None;
            let mut having_clause = None;
            let mut order_by_clause = None;
            let mut limit_clause = None;
            for arg in iter {
                match arg {
                    Transformed::FromClause(clause) if from_clause.is_none() => {
                        from_clause = Some(clause);
                    }
                    Transformed::Raw(tree) => {
                        let slot = match tree.production {
                            Production::GroupByClause => &mut group_by_clause,
                            Production::HavingClause => &mut having_clause,
                            Production::OrderByClause => &mut order_by_clause,
                            Production::LimitClause => &mut limit_clause,
                            other => {
                                return Err(skew(
                                    production,
                                    format!("unexpected raw {} subtree", other.rule_name()),
                                ));
                            }
                        };
                        if slot.is_some() {
                            return Err(skew(
                                production,
                                format!("duplicate {} subtree", tree.production.rule_name()),
                            ));
                        }
                        *slot = Some(UnmodeledClause::new(tree));
                    }
                    other => {
                        return Err(skew(
                            production,
                            format!("unexpected {} child", other.kind_name()),
                        ));
                    }
                }
            }
            single(Transformed::Stmnt(Statement::Select(SelectStmnt {
                select_clause,
                from_clause,
                group_by_clause,
                having_clause,
                order_by_clause,
                limit_clause,
            })))
        }

        Production::InsertStmnt => {
            let mut table_name = None;
            let mut columns = Vec::new();
            let mut values = Vec::new();
            for arg in args {
                match arg {
                    Transformed::TableName(name) if table_name.is_none() => {
                        table_name = Some(name);
                    }
                    Transformed::ColumnName(name) => columns.push(name),
                    Transformed::Atom(SelectableAtom::Literal { value }) => values.push(value),
                    Transformed::Atom(SelectableAtom::ColumnRef { .. }) => {
                        return Err(skew(production, "insert values must be literals"));
                    }
                    other => {
                        return Err(skew(
                            production,
                            format!("unexpected {} child", other.kind_name()),
                        ));
                    }
                }
            }
            let table_name =
                table_name.ok_or_else(|| skew(production, "expected a table name"))?;
            single(Transformed::Stmnt(Statement::Insert(InsertStmnt {
                table_name,
                columns,
                values,
            })))
        }

        Production::UpdateStmnt => {
            let mut iter = args.into_iter();
            let table_name = match iter.next() {
                Some(Transformed::TableName(name)) => name,
                _ => return Err(skew(production, "expected a table name first")),
            };
            let mut assignments = Vec::new();
            let mut where_clause = None;
            for arg in iter {
                match arg {
                    Transformed::Assignment(assign) => assignments.push(assign),
                    Transformed::WhereClause(clause) if where_clause.is_none() => {
                        where_clause = Some(clause);
                    }
                    other => {
                        return Err(skew(
                            production,
                            format!("unexpected {} child", other.kind_name()),
                        ));
                    }
                }
            }
            if assignments.is_empty() {
                return Err(skew(production, "expected at least one assignment"));
            }
            single(Transformed::Stmnt(Statement::Update(UpdateStmnt {
                table_name,
                assignments,
                where_clause,
            })))
        }

        Production::DeleteStmnt => match <[Transformed; 1]>::try_from(args) {
            Ok([Transformed::FromClause(from_clause)]) => single(Transformed::Stmnt(
                Statement::Delete(DeleteStmnt { from_clause }),
            )),
            _ => Err(skew(production, "expected exactly one from clause")),
        },

        Production::DropStmnt => match <[Transformed; 1]>::try_from(args) {
            Ok([Transformed::TableName(table_name)]) => {
                single(Transformed::Stmnt(Statement::Drop(DropStmnt { table_name })))
            }
            _ => Err(skew(production, "expected exactly one table name")),
        },

        // Recognized rules without a finished handler.
        Production::TruncateStmnt | Production::JoinSource | Production::CaseExpr => {
            Err(TransformError::Unsupported { production })
        }

        Production::TableName => match <[Transformed; 1]>::try_from(args) {
            Ok([Transformed::Token(token)]) => {
                single(Transformed::TableName(TableName::new(token.lexeme)))
            }
            _ => Err(skew(production, "expected exactly one name token")),
        },

        Production::ColumnName => match <[Transformed; 1]>::try_from(args) {
            Ok([Transformed::Token(token)]) => {
                single(Transformed::ColumnName(ColumnName::new(token.lexeme)))
            }
            _ => Err(skew(production, "expected exactly one name token")),
        },

        Production::Datatype => match <[Transformed; 1]>::try_from(args) {
            Ok([Transformed::Token(token)]) => match DataType::from_name(&token.lexeme) {
                Some(datatype) => single(Transformed::Datatype(datatype)),
                None => Err(TransformError::UnrecognizedDatatype {
                    lexeme: token.lexeme,
                }),
            },
            _ => Err(skew(production, "expected exactly one datatype token")),
        },

        Production::PrimaryKey => {
            if args.is_empty() {
                single(Transformed::Modifier(ColumnModifier::PrimaryKey))
            } else {
                Err(skew(
                    production,
                    format!("expected 0 children, received {}", args.len()),
                ))
            }
        }

        Production::NotNull => {
            if args.is_empty() {
                single(Transformed::Modifier(ColumnModifier::NotNull))
            } else {
                Err(skew(
                    production,
                    format!("expected 0 children, received {}", args.len()),
                ))
            }
        }

        Production::ColumnDef => {
            // First two children are always name and datatype; at most one
            // trailing modifier may follow.
            let mut iter = args.into_iter();
            let (column_name, datatype) = match (iter.next(), iter.next()) {
                (Some(Transformed::ColumnName(name)), Some(Transformed::Datatype(datatype))) => {
                    (name, datatype)
                }
                _ => return Err(skew(production, "expected column name then datatype")),
            };
            let modifier = match iter.next() {
                None => ColumnModifier::Nil,
                Some(Transformed::Modifier(modifier)) => modifier,
                Some(other) => {
                    return Err(skew(
                        production,
                        format!("expected a modifier, received {}", other.kind_name()),
                    ));
                }
            };
            if iter.next().is_some() {
                return Err(skew(production, "at most one trailing modifier"));
            }
            single(Transformed::ColumnDef(ColumnDef::new(
                column_name,
                datatype,
                modifier,
            )))
        }

        Production::SelectClause => {
            let mut items = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Transformed::Selectable(selectable) => items.push(selectable),
                    other => {
                        return Err(skew(
                            production,
                            format!("expected a selectable, received {}", other.kind_name()),
                        ));
                    }
                }
            }
            single(Transformed::SelectClause(SelectClause::new(items)))
        }

        Production::Selectable => match <[Transformed; 1]>::try_from(args) {
            Ok([Transformed::Atom(atom)]) => single(Transformed::Selectable(Selectable::new(
                SelectableItem::Atom(atom),
            ))),
            Ok([Transformed::Item(item)]) => {
                single(Transformed::Selectable(Selectable::new(item)))
            }
            _ => Err(skew(production, "expected exactly one atom or item")),
        },

        // Pure passthrough rules.
        Production::Primary | Production::Source => match <[Transformed; 1]>::try_from(args) {
            Ok([value]) => single(value),
            _ => Err(skew(production, "expected exactly one child")),
        },

        Production::Literal => match <[Transformed; 1]>::try_from(args) {
            Ok([Transformed::Token(token)]) => {
                let value = match (token.literal, token.kind) {
                    (Some(value), _) => value,
                    (None, TokenType::Null) => Value::Null,
                    (None, _) => {
                        return Err(skew(production, "literal token without a decoded value"));
                    }
                };
                single(Transformed::Atom(SelectableAtom::Literal { value }))
            }
            _ => Err(skew(production, "expected exactly one literal token")),
        },

        Production::ColumnRef => match <[Transformed; 1]>::try_from(args) {
            Ok([Transformed::Token(token)]) => single(Transformed::Atom(
                SelectableAtom::ColumnRef { name: token.lexeme },
            )),
            _ => Err(skew(production, "expected exactly one name token")),
        },

        Production::FuncCall => {
            let mut iter = args.into_iter();
            let name = match iter.next() {
                Some(Transformed::Token(token)) => token.lexeme,
                _ => return Err(skew(production, "expected a function name token first")),
            };
            let mut call_args = Vec::new();
            for arg in iter {
                match arg {
                    Transformed::Atom(atom) => call_args.push(atom),
                    other => {
                        return Err(skew(
                            production,
                            format!("expected an atom argument, received {}", other.kind_name()),
                        ));
                    }
                }
            }
            single(Transformed::Item(SelectableItem::FuncCall {
                name,
                args: call_args,
            }))
        }

        Production::FromClause => {
            let mut iter = args.into_iter();
            let source = match iter.next() {
                Some(Transformed::TableName(name)) => name,
                _ => return Err(skew(production, "expected a source first")),
            };
            let where_clause = match iter.next() {
                None => None,
                Some(Transformed::WhereClause(clause)) => Some(clause),
                Some(other) => {
                    return Err(skew(
                        production,
                        format!("expected a where clause, received {}", other.kind_name()),
                    ));
                }
            };
            if iter.next().is_some() {
                return Err(skew(production, "unexpected trailing children"));
            }
            single(Transformed::FromClause(FromClause::new(
                source,
                where_clause,
            )))
        }

        Production::WhereClause => match <[Transformed; 1]>::try_from(args) {
            Ok([Transformed::Raw(tree)]) if tree.production == Production::Condition => single(
                Transformed::WhereClause(WhereClause::new(UnmodeledClause::new(tree))),
            ),
            _ => Err(skew(production, "expected exactly one condition subtree")),
        },

        Production::Assignment => match <[Transformed; 2]>::try_from(args) {
            Ok(
                [
                    Transformed::ColumnName(column),
                    Transformed::Atom(SelectableAtom::Literal { value }),
                ],
            ) => single(Transformed::Assignment(Assignment { column, value })),
            _ => Err(skew(production, "expected a column name and a literal")),
        },

        // Grouping and unmodeled rules never reach dispatch; the walk
        // handles them before calling apply.
        Production::ColumnDefList
        | Production::ColumnNameList
        | Production::ValueList
        | Production::FuncArgList
        | Production::Condition
        | Production::GroupByClause
        | Production::HavingClause
        | Production::OrderByClause
        | Production::LimitClause => Err(skew(production, "rule is not dispatched directly")),
    }
}
