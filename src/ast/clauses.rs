use std::fmt;

use crate::ast::print::{AstPrint, PrintItem};
use crate::ast::statements::TableName;
use crate::parse_tree::{ParseTree, Production};
use crate::value::Value;

/// The atomic operand of a select item: a literal value or a reference to
/// a column of the current record.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectableAtom {
    ColumnRef { name: String },
    Literal { value: Value },
}

impl fmt::Display for SelectableAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectableAtom::ColumnRef { name } => write!(f, "{}", name),
            SelectableAtom::Literal { value } => write!(f, "{}", value),
        }
    }
}

/// The body of one select item.
///
/// In `select 1, upper(name) from people`, `1` is an atom item and
/// `upper(name)` is a function call over the atom `name`.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectableItem {
    Atom(SelectableAtom),
    FuncCall {
        name: String,
        args: Vec<SelectableAtom>,
    },
}

impl fmt::Display for SelectableItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectableItem::Atom(atom) => write!(f, "{}", atom),
            SelectableItem::FuncCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// One item of a select clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Selectable {
    pub item: SelectableItem,
}

impl Selectable {
    pub fn new(item: SelectableItem) -> Self {
        Selectable { item }
    }
}

impl AstPrint for Selectable {
    fn type_name(&self) -> &'static str {
        "Selectable"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        vec![PrintItem::Leaf(self.item.to_string())]
    }
}

/// The ordered items of a select clause.
///
/// Virtual: grouping-only, so its items print at the parent's child depth
/// with no `SelectClause:` header.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub items: Vec<Selectable>,
}

impl SelectClause {
    pub fn new(items: Vec<Selectable>) -> Self {
        SelectClause { items }
    }
}

impl AstPrint for SelectClause {
    fn type_name(&self) -> &'static str {
        "SelectClause"
    }

    fn is_virtual(&self) -> bool {
        true
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        self.items
            .iter()
            .map(|item| PrintItem::Node(item as &dyn AstPrint))
            .collect()
    }
}

/// A clause whose grammar is not modeled yet; the raw subtree is carried
/// verbatim until the rule stabilizes into a real node type.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmodeledClause {
    pub production: Production,
    pub tree: ParseTree,
}

impl UnmodeledClause {
    pub fn new(tree: ParseTree) -> Self {
        UnmodeledClause {
            production: tree.production,
            tree,
        }
    }
}

/// A where clause is only ever nested in a clause that names its rows
/// (from, or the update statement's own where slot); there is no
/// standalone where.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub condition: UnmodeledClause,
}

impl WhereClause {
    pub fn new(condition: UnmodeledClause) -> Self {
        WhereClause { condition }
    }
}

impl AstPrint for WhereClause {
    fn type_name(&self) -> &'static str {
        "WhereClause"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        vec![PrintItem::Subtree(&self.condition.tree)]
    }
}

/// The row source of a select or delete statement.
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub source: TableName,
    pub where_clause: Option<WhereClause>,
}

impl FromClause {
    pub fn new(source: TableName, where_clause: Option<WhereClause>) -> Self {
        FromClause {
            source,
            where_clause,
        }
    }
}

impl AstPrint for FromClause {
    fn type_name(&self) -> &'static str {
        "FromClause"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        let mut items = vec![PrintItem::Node(&self.source as &dyn AstPrint)];
        if let Some(where_clause) = &self.where_clause {
            items.push(PrintItem::Node(where_clause as &dyn AstPrint));
        }
        items
    }
}

/// Join flavor. Declared ahead of the joined-source node; a join in the
/// input currently surfaces as an unsupported construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}
