use std::fmt;

use crate::ast::clauses::{FromClause, SelectClause, UnmodeledClause, WhereClause};
use crate::ast::print::{AstPrint, PrintItem};
use crate::value::Value;

/// Column datatype as understood by the parser.
///
/// This is the parser's notion of datatypes, which may differ from the
/// storage engine's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Real,
    Text,
    Blob,
}

impl DataType {
    /// Map a datatype name to its variant, case-insensitively.
    pub fn from_name(name: &str) -> Option<DataType> {
        match name.to_ascii_lowercase().as_str() {
            "integer" => Some(DataType::Integer),
            "real" => Some(DataType::Real),
            "text" => Some(DataType::Text),
            "blob" => Some(DataType::Blob),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Column modifier trailing a column definition.
///
/// The grammar allows at most one: primary-key and not-null are mutually
/// exclusive at that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnModifier {
    PrimaryKey,
    NotNull,
    /// No modifier present.
    Nil,
}

/// Name of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableName {
    pub name: String,
}

impl TableName {
    pub fn new(name: String) -> Self {
        TableName { name }
    }
}

impl AstPrint for TableName {
    fn type_name(&self) -> &'static str {
        "TableName"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        vec![PrintItem::Leaf(self.name.clone())]
    }
}

/// Name of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnName {
    pub name: String,
}

impl ColumnName {
    pub fn new(name: String) -> Self {
        ColumnName { name }
    }
}

impl AstPrint for ColumnName {
    fn type_name(&self) -> &'static str {
        "ColumnName"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        vec![PrintItem::Leaf(self.name.clone())]
    }
}

/// One column definition of a create-table statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub column_name: ColumnName,
    pub datatype: DataType,
    pub is_primary_key: bool,
    pub is_nullable: bool,
}

impl ColumnDef {
    pub fn new(column_name: ColumnName, datatype: DataType, modifier: ColumnModifier) -> Self {
        ColumnDef {
            column_name,
            datatype,
            is_primary_key: modifier == ColumnModifier::PrimaryKey,
            // TODO: confirm the intended polarity of is_nullable for the
            // NOT NULL modifier with the product owner; pinned by
            // test_not_null_column_reports_nullable until then.
            is_nullable: modifier == ColumnModifier::NotNull
                || modifier == ColumnModifier::PrimaryKey,
        }
    }
}

impl AstPrint for ColumnDef {
    fn type_name(&self) -> &'static str {
        "ColumnDef"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        vec![
            PrintItem::Node(&self.column_name as &dyn AstPrint),
            PrintItem::Leaf(self.datatype.to_string()),
            PrintItem::Leaf(self.is_primary_key.to_string()),
            PrintItem::Leaf(self.is_nullable.to_string()),
        ]
    }
}

/// Constraint failure raised when a create-table statement does not have
/// exactly one primary-key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Number of primary-key columns observed.
    pub count: usize,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected 1 primary key, received {}", self.count)
    }
}

impl std::error::Error for ConstraintViolation {}

/// A create-table statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateStmnt {
    pub table_name: TableName,
    pub columns: Vec<ColumnDef>,
}

impl CreateStmnt {
    /// Build the statement, validating that exactly one column carries the
    /// primary-key modifier. An invalid statement never produces a value.
    pub fn new(
        table_name: TableName,
        columns: Vec<ColumnDef>,
    ) -> Result<Self, ConstraintViolation> {
        let count = columns.iter().filter(|col| col.is_primary_key).count();
        if count != 1 {
            return Err(ConstraintViolation { count });
        }
        Ok(CreateStmnt {
            table_name,
            columns,
        })
    }
}

impl AstPrint for CreateStmnt {
    fn type_name(&self) -> &'static str {
        "CreateStmnt"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        let mut items = vec![PrintItem::Node(&self.table_name as &dyn AstPrint)];
        items.extend(
            self.columns
                .iter()
                .map(|col| PrintItem::Node(col as &dyn AstPrint)),
        );
        items
    }
}

/// A select statement.
///
/// The tail clauses are not modeled yet; their raw subtrees are carried
/// until those rules stabilize.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmnt {
    pub select_clause: SelectClause,
    pub from_clause: Option<FromClause>,
    pub group_by_clause: Option<UnmodeledClause>,
    pub having_clause: Option<UnmodeledClause>,
    pub order_by_clause: Option<UnmodeledClause>,
    pub limit_clause: Option<UnmodeledClause>,
}

impl AstPrint for SelectStmnt {
    fn type_name(&self) -> &'static str {
        "SelectStmnt"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        let mut items = vec![PrintItem::Node(&self.select_clause as &dyn AstPrint)];
        if let Some(from_clause) = &self.from_clause {
            items.push(PrintItem::Node(from_clause as &dyn AstPrint));
        }
        for clause in [
            &self.group_by_clause,
            &self.having_clause,
            &self.order_by_clause,
            &self.limit_clause,
        ]
        .into_iter()
        .flatten()
        {
            items.push(PrintItem::Subtree(&clause.tree));
        }
        items
    }
}

/// An insert statement with explicit column list and literal values.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmnt {
    pub table_name: TableName,
    pub columns: Vec<ColumnName>,
    pub values: Vec<Value>,
}

impl AstPrint for InsertStmnt {
    fn type_name(&self) -> &'static str {
        "InsertStmnt"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        let mut items = vec![PrintItem::Node(&self.table_name as &dyn AstPrint)];
        items.extend(
            self.columns
                .iter()
                .map(|col| PrintItem::Node(col as &dyn AstPrint)),
        );
        items.extend(
            self.values
                .iter()
                .map(|val| PrintItem::Leaf(val.to_string())),
        );
        items
    }
}

/// One `column = value` assignment of an update statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: ColumnName,
    pub value: Value,
}

impl AstPrint for Assignment {
    fn type_name(&self) -> &'static str {
        "Assignment"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        vec![
            PrintItem::Node(&self.column as &dyn AstPrint),
            PrintItem::Leaf(self.value.to_string()),
        ]
    }
}

/// An update statement. The grammar gives update its own where slot; it is
/// the one statement with a where clause outside a from clause.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmnt {
    pub table_name: TableName,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<WhereClause>,
}

impl AstPrint for UpdateStmnt {
    fn type_name(&self) -> &'static str {
        "UpdateStmnt"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        let mut items = vec![PrintItem::Node(&self.table_name as &dyn AstPrint)];
        items.extend(
            self.assignments
                .iter()
                .map(|assign| PrintItem::Node(assign as &dyn AstPrint)),
        );
        if let Some(where_clause) = &self.where_clause {
            items.push(PrintItem::Node(where_clause as &dyn AstPrint));
        }
        items
    }
}

/// A delete statement; the dialect spells it `delete from <source>`, so it
/// holds a full from clause.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmnt {
    pub from_clause: FromClause,
}

impl AstPrint for DeleteStmnt {
    fn type_name(&self) -> &'static str {
        "DeleteStmnt"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        vec![PrintItem::Node(&self.from_clause as &dyn AstPrint)]
    }
}

/// A drop-table statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropStmnt {
    pub table_name: TableName,
}

impl AstPrint for DropStmnt {
    fn type_name(&self) -> &'static str {
        "DropStmnt"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        vec![PrintItem::Node(&self.table_name as &dyn AstPrint)]
    }
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Create(CreateStmnt),
    Select(SelectStmnt),
    Insert(InsertStmnt),
    Update(UpdateStmnt),
    Delete(DeleteStmnt),
    Drop(DropStmnt),
}

impl Statement {
    fn inner(&self) -> &dyn AstPrint {
        match self {
            Statement::Create(stmnt) => stmnt,
            Statement::Select(stmnt) => stmnt,
            Statement::Insert(stmnt) => stmnt,
            Statement::Update(stmnt) => stmnt,
            Statement::Delete(stmnt) => stmnt,
            Statement::Drop(stmnt) => stmnt,
        }
    }
}

impl AstPrint for Statement {
    fn type_name(&self) -> &'static str {
        self.inner().type_name()
    }

    fn is_virtual(&self) -> bool {
        self.inner().is_virtual()
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        self.inner().print_items()
    }
}

/// An ordered sequence of statements; the top-level unit of a source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }
}

impl AstPrint for Program {
    fn type_name(&self) -> &'static str {
        "Program"
    }

    fn print_items(&self) -> Vec<PrintItem<'_>> {
        self.statements
            .iter()
            .map(|stmnt| PrintItem::Node(stmnt as &dyn AstPrint))
            .collect()
    }
}
