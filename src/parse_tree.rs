//! The untyped parse tree handed over by the external parser.
//!
//! Nodes are tagged with a [`Production`] — a closed, compile-time
//! enumeration of the grammar's reachable rules — rather than a rule-name
//! string, so transformer dispatch is a single exhaustive `match`.

use crate::ast::tokens::Token;

/// A grammar production reachable from valid input.
///
/// The transformer supplies one handler per variant; a variant without a
/// finished handler fails transformation with an unsupported-construct
/// error rather than silently producing nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    Program,

    // statements
    CreateStmnt,
    SelectStmnt,
    InsertStmnt,
    UpdateStmnt,
    DeleteStmnt,
    DropStmnt,
    TruncateStmnt,

    // create components
    TableName,
    ColumnDefList,
    ColumnDef,
    ColumnName,
    Datatype,
    PrimaryKey,
    NotNull,

    // select components
    SelectClause,
    Selectable,
    Primary,
    Literal,
    ColumnRef,
    FuncCall,
    FuncArgList,
    CaseExpr,
    FromClause,
    Source,
    JoinSource,
    WhereClause,
    Condition,
    GroupByClause,
    HavingClause,
    OrderByClause,
    LimitClause,

    // insert/update components
    ColumnNameList,
    ValueList,
    Assignment,
}

impl Production {
    /// Grammar rule name, for diagnostics and parse-tree dumps.
    pub fn rule_name(self) -> &'static str {
        match self {
            Production::Program => "program",
            Production::CreateStmnt => "create_stmnt",
            Production::SelectStmnt => "select_stmnt",
            Production::InsertStmnt => "insert_stmnt",
            Production::UpdateStmnt => "update_stmnt",
            Production::DeleteStmnt => "delete_stmnt",
            Production::DropStmnt => "drop_stmnt",
            Production::TruncateStmnt => "truncate_stmnt",
            Production::TableName => "table_name",
            Production::ColumnDefList => "column_def_list",
            Production::ColumnDef => "column_def",
            Production::ColumnName => "column_name",
            Production::Datatype => "datatype",
            Production::PrimaryKey => "primary_key",
            Production::NotNull => "not_null",
            Production::SelectClause => "select_clause",
            Production::Selectable => "selectable",
            Production::Primary => "primary",
            Production::Literal => "literal",
            Production::ColumnRef => "column_ref",
            Production::FuncCall => "func_call",
            Production::FuncArgList => "func_arg_list",
            Production::CaseExpr => "case_expr",
            Production::FromClause => "from_clause",
            Production::Source => "source",
            Production::JoinSource => "join_source",
            Production::WhereClause => "where_clause",
            Production::Condition => "condition",
            Production::GroupByClause => "group_by_clause",
            Production::HavingClause => "having_clause",
            Production::OrderByClause => "order_by_clause",
            Production::LimitClause => "limit_clause",
            Production::ColumnNameList => "column_name_list",
            Production::ValueList => "value_list",
            Production::Assignment => "assignment",
        }
    }

    /// Grouping rules are transparent: their converted children are spliced
    /// into the parent's argument list and no node is materialized.
    pub fn is_grouping(self) -> bool {
        matches!(
            self,
            Production::ColumnDefList
                | Production::ColumnNameList
                | Production::ValueList
                | Production::FuncArgList
        )
    }

    /// Unmodeled rules keep their subtree verbatim: the transformer does
    /// not recurse into them, and the raw tree is carried into the AST.
    pub fn is_unmodeled(self) -> bool {
        matches!(
            self,
            Production::Condition
                | Production::GroupByClause
                | Production::HavingClause
                | Production::OrderByClause
                | Production::LimitClause
        )
    }
}

/// One child of a parse-tree node: a nested rule or a token leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseChild {
    Tree(ParseTree),
    Token(Token),
}

/// A node of the concrete parse tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree {
    pub production: Production,
    pub children: Vec<ParseChild>,
}

impl ParseTree {
    pub fn new(production: Production, children: Vec<ParseChild>) -> Self {
        ParseTree {
            production,
            children,
        }
    }

    /// A nested node, ready to use as a child.
    pub fn branch(production: Production, children: Vec<ParseChild>) -> ParseChild {
        ParseChild::Tree(ParseTree::new(production, children))
    }

    /// A token leaf, ready to use as a child.
    pub fn leaf(token: Token) -> ParseChild {
        ParseChild::Token(token)
    }

    /// Indented dump of the subtree, one line per node or leaf.
    ///
    /// Recomputed on every call; joining the lines reproduces the tree.
    pub fn pretty(&self, depth: usize) -> Vec<String> {
        let mut lines = vec![format!("{}{}", "  ".repeat(depth), self.production.rule_name())];
        for child in &self.children {
            match child {
                ParseChild::Tree(tree) => lines.extend(tree.pretty(depth + 1)),
                ParseChild::Token(token) => {
                    lines.push(format!("{}{}", "  ".repeat(depth + 1), token));
                }
            }
        }
        lines
    }
}

#[test]
fn test_pretty_dump() {
    let tree = ParseTree::new(
        Production::TableName,
        vec![ParseTree::leaf(Token::identifier("foo", 1))],
    );
    assert_eq!(tree.pretty(0), vec!["table_name", "  Identifier[foo]"]);
}
