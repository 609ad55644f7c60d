//! Per-row value evaluation for select-clause items.
//!
//! When a select statement is planned, each item of its select clause is
//! compiled into one evaluator; result iteration then calls `get_value`
//! once per record. Evaluators hold no mutable state (the group
//! accumulator excepted), so a call is referentially transparent given the
//! same record and a pure function.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::clauses::{SelectClause, Selectable, SelectableAtom, SelectableItem};
use crate::functions::{AggregateFunction, FunctionRegistry, ScalarFunction};
use crate::record::Record;
use crate::value::Value;

/// Errors that can occur during evaluation or select-item compilation.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// A column reference resolved to no field of the record.
    MissingColumn(String),

    /// A select item names a function the registry does not know.
    UnknownFunction(String),

    /// A function failed; carried unchanged to the evaluation caller.
    Function { name: String, message: String },

    /// An evaluator was built with an argument shape it cannot serve.
    Arity(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::MissingColumn(name) => {
                write!(f, "missing column: {} is not a field of the record", name)
            }
            EvalError::UnknownFunction(name) => write!(f, "unknown function: {}", name),
            EvalError::Function { name, message } => write!(f, "function {}: {}", name, message),
            EvalError::Arity(message) => write!(f, "arity error: {}", message),
        }
    }
}

impl std::error::Error for EvalError {}

/// Resolve one atom against a record: a literal yields its carried value
/// unconditionally; a column reference looks the name up, and an absent
/// name is a lookup failure, never a silent null.
fn resolve_atom(atom: &SelectableAtom, record: &dyn Record) -> Result<Value, EvalError> {
    match atom {
        SelectableAtom::Literal { value } => Ok(value.clone()),
        SelectableAtom::ColumnRef { name } => record
            .get(name)
            .ok_or_else(|| EvalError::MissingColumn(name.clone())),
    }
}

/// Single-column (or single-literal) evaluator: the simplified form of
/// [`ValueGenerator`] with no function and no argument lists.
#[derive(Debug, Clone)]
pub struct ValueExtractor {
    pos_arg: SelectableAtom,
}

impl ValueExtractor {
    pub fn new(pos_arg: SelectableAtom) -> Self {
        ValueExtractor { pos_arg }
    }

    pub fn get_value(&self, record: &dyn Record) -> Result<Value, EvalError> {
        resolve_atom(&self.pos_arg, record)
    }
}

/// Generates one output value per record for one select item.
///
/// Positional atoms resolve in order, named atoms resolve into a map over
/// the same key set, and the function (if any) is applied to the resolved
/// arguments. With no function the generator degenerates to the
/// single-atom case.
pub struct ValueGenerator {
    pos_args: Vec<SelectableAtom>,
    named_args: HashMap<String, SelectableAtom>,
    func: Option<Arc<dyn ScalarFunction>>,
}

impl fmt::Debug for ValueGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueGenerator")
            .field("pos_args", &self.pos_args)
            .field("named_args", &self.named_args)
            .field("func", &self.func.as_ref().map(|_| "<scalar function>"))
            .finish()
    }
}

impl ValueGenerator {
    pub fn new(
        pos_args: Vec<SelectableAtom>,
        named_args: HashMap<String, SelectableAtom>,
        func: Option<Arc<dyn ScalarFunction>>,
    ) -> Self {
        ValueGenerator {
            pos_args,
            named_args,
            func,
        }
    }

    /// A function-less generator over a single atom.
    pub fn from_atom(atom: SelectableAtom) -> Self {
        ValueGenerator::new(vec![atom], HashMap::new(), None)
    }

    /// Invoked once per record while iterating a recordset.
    pub fn get_value(&self, record: &dyn Record) -> Result<Value, EvalError> {
        let mut pos_values = Vec::with_capacity(self.pos_args.len());
        for atom in &self.pos_args {
            pos_values.push(resolve_atom(atom, record)?);
        }
        let mut named_values = HashMap::with_capacity(self.named_args.len());
        for (name, atom) in &self.named_args {
            named_values.insert(name.clone(), resolve_atom(atom, record)?);
        }

        match &self.func {
            Some(func) => func.apply(&pos_values, &named_values),
            None => {
                // Without a function this is the single-atom case.
                if pos_values.len() == 1 && named_values.is_empty() {
                    Ok(pos_values.remove(0))
                } else {
                    Err(EvalError::Arity(format!(
                        "a generator without a function takes exactly one positional atom, \
                         received {} positional and {} named",
                        pos_values.len(),
                        named_values.len()
                    )))
                }
            }
        }
    }
}

/// Generates one output value per record *group*.
///
/// Feed each member record through `accumulate`, then call `finalize` once
/// the group is exhausted. The accumulation strategy is owned by the
/// aggregate function; each group gets its own exclusively owned instance.
pub struct GroupValueGenerator {
    pos_args: Vec<SelectableAtom>,
    named_args: HashMap<String, SelectableAtom>,
    func: Box<dyn AggregateFunction>,
}

impl GroupValueGenerator {
    pub fn new(
        pos_args: Vec<SelectableAtom>,
        named_args: HashMap<String, SelectableAtom>,
        func: Box<dyn AggregateFunction>,
    ) -> Self {
        GroupValueGenerator {
            pos_args,
            named_args,
            func,
        }
    }

    /// Fold one member record into the group's accumulator.
    pub fn accumulate(&mut self, record: &dyn Record) -> Result<(), EvalError> {
        let mut pos_values = Vec::with_capacity(self.pos_args.len());
        for atom in &self.pos_args {
            pos_values.push(resolve_atom(atom, record)?);
        }
        let mut named_values = HashMap::with_capacity(self.named_args.len());
        for (name, atom) in &self.named_args {
            named_values.insert(name.clone(), resolve_atom(atom, record)?);
        }
        self.func.accumulate(&pos_values, &named_values)
    }

    /// The aggregate value for the exhausted group.
    pub fn finalize(&self) -> Result<Value, EvalError> {
        self.func.finalize()
    }
}

/// Compile one select item into its evaluator, binding any function name
/// against the registry.
pub fn compile_selectable(
    selectable: &Selectable,
    registry: &FunctionRegistry,
) -> Result<ValueGenerator, EvalError> {
    match &selectable.item {
        SelectableItem::Atom(atom) => Ok(ValueGenerator::from_atom(atom.clone())),
        SelectableItem::FuncCall { name, args } => {
            let func = registry.resolve_scalar(name)?;
            Ok(ValueGenerator::new(args.clone(), HashMap::new(), Some(func)))
        }
    }
}

/// Compile a whole select clause, one evaluator per item, in item order.
pub fn compile_select_clause(
    clause: &SelectClause,
    registry: &FunctionRegistry,
) -> Result<Vec<ValueGenerator>, EvalError> {
    clause
        .items
        .iter()
        .map(|selectable| compile_selectable(selectable, registry))
        .collect()
}
