//! Function registry and the builtin scalar and aggregate functions.
//!
//! The evaluation engine treats functions as opaque callables: a scalar
//! function maps resolved arguments to one value per row; an aggregate
//! function owns its accumulation strategy and is fed one row at a time.
//! Hosts register their own callables alongside the builtins.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::evaluator::EvalError;
use crate::value::Value;

/// A function applied per row in a select item, e.g. `upper(name)`.
///
/// Pure with respect to the engine: no side effects are assumed, and any
/// failure it raises propagates unchanged to the evaluator's caller.
pub trait ScalarFunction {
    fn name(&self) -> &str;

    fn apply(
        &self,
        pos_args: &[Value],
        named_args: &HashMap<String, Value>,
    ) -> Result<Value, EvalError>;
}

/// A function applied across the rows of one group.
///
/// The accumulation strategy (sum, count, max, ...) is owned by the
/// function; the engine only feeds rows in and retrieves the final value.
/// Each group gets its own exclusively owned instance.
pub trait AggregateFunction {
    /// Fold one member row's resolved arguments into the accumulator.
    fn accumulate(
        &mut self,
        pos_args: &[Value],
        named_args: &HashMap<String, Value>,
    ) -> Result<(), EvalError>;

    /// The aggregate value, once the group is exhausted.
    fn finalize(&self) -> Result<Value, EvalError>;
}

type AggregateFactory = Arc<dyn Fn() -> Box<dyn AggregateFunction>>;

/// Resolves function names used in select items to callables.
///
/// Names are case-insensitive. Resolving an unknown name is this
/// registry's responsibility and yields [`EvalError::UnknownFunction`].
pub struct FunctionRegistry {
    scalars: HashMap<String, Arc<dyn ScalarFunction>>,
    aggregates: HashMap<String, AggregateFactory>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        FunctionRegistry {
            scalars: HashMap::new(),
            aggregates: HashMap::new(),
        }
    }

    /// A registry preloaded with the builtin functions.
    pub fn with_builtins() -> Self {
        let mut registry = FunctionRegistry::new();
        registry.register_scalar(Arc::new(Upper));
        registry.register_scalar(Arc::new(Lower));
        registry.register_scalar(Arc::new(Length));
        registry.register_scalar(Arc::new(Matches));
        registry.register_aggregate("count", || Box::new(Count { rows: 0 }));
        registry.register_aggregate("sum", || Box::new(Sum { total: None }));
        registry.register_aggregate(
            "min",
            || Box::new(Extremum { keep: Ordering::Less, best: None }),
        );
        registry.register_aggregate(
            "max",
            || Box::new(Extremum { keep: Ordering::Greater, best: None }),
        );
        registry
    }

    pub fn register_scalar(&mut self, func: Arc<dyn ScalarFunction>) {
        self.scalars.insert(func.name().to_ascii_lowercase(), func);
    }

    pub fn register_aggregate(
        &mut self,
        name: &str,
        factory: impl Fn() -> Box<dyn AggregateFunction> + 'static,
    ) {
        self.aggregates
            .insert(name.to_ascii_lowercase(), Arc::new(factory));
    }

    pub fn resolve_scalar(&self, name: &str) -> Result<Arc<dyn ScalarFunction>, EvalError> {
        self.scalars
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))
    }

    /// A fresh accumulator instance for one group.
    pub fn new_aggregate(&self, name: &str) -> Result<Box<dyn AggregateFunction>, EvalError> {
        let factory = self
            .aggregates
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        Ok(factory())
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        FunctionRegistry::new()
    }
}

fn failure(name: &str, message: impl Into<String>) -> EvalError {
    EvalError::Function {
        name: name.to_string(),
        message: message.into(),
    }
}

fn single_arg<'a>(
    name: &str,
    pos_args: &'a [Value],
    named_args: &HashMap<String, Value>,
) -> Result<&'a Value, EvalError> {
    match (pos_args, named_args.is_empty()) {
        ([value], true) => Ok(value),
        _ => Err(failure(
            name,
            format!("takes exactly one argument, received {}", pos_args.len()),
        )),
    }
}

/// `upper(text)` - uppercase a text value; null passes through.
struct Upper;

impl ScalarFunction for Upper {
    fn name(&self) -> &str {
        "upper"
    }

    fn apply(
        &self,
        pos_args: &[Value],
        named_args: &HashMap<String, Value>,
    ) -> Result<Value, EvalError> {
        match single_arg("upper", pos_args, named_args)? {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => Ok(Value::Text(text.to_uppercase())),
            other => Err(failure(
                "upper",
                format!("expected text, received {}", other.type_name()),
            )),
        }
    }
}

/// `lower(text)` - lowercase a text value; null passes through.
struct Lower;

impl ScalarFunction for Lower {
    fn name(&self) -> &str {
        "lower"
    }

    fn apply(
        &self,
        pos_args: &[Value],
        named_args: &HashMap<String, Value>,
    ) -> Result<Value, EvalError> {
        match single_arg("lower", pos_args, named_args)? {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => Ok(Value::Text(text.to_lowercase())),
            other => Err(failure(
                "lower",
                format!("expected text, received {}", other.type_name()),
            )),
        }
    }
}

/// `length(text | blob)` - character count of a text value or byte count
/// of a blob; null passes through.
struct Length;

impl ScalarFunction for Length {
    fn name(&self) -> &str {
        "length"
    }

    fn apply(
        &self,
        pos_args: &[Value],
        named_args: &HashMap<String, Value>,
    ) -> Result<Value, EvalError> {
        match single_arg("length", pos_args, named_args)? {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => Ok(Value::Integer(text.chars().count() as i64)),
            Value::Blob(bytes) => Ok(Value::Integer(bytes.len() as i64)),
            other => Err(failure(
                "length",
                format!("expected text or blob, received {}", other.type_name()),
            )),
        }
    }
}

/// `matches(text, pattern)` - 1 if the text matches the regex pattern,
/// else 0; null text passes through.
struct Matches;

impl ScalarFunction for Matches {
    fn name(&self) -> &str {
        "matches"
    }

    fn apply(
        &self,
        pos_args: &[Value],
        named_args: &HashMap<String, Value>,
    ) -> Result<Value, EvalError> {
        if !named_args.is_empty() || pos_args.len() != 2 {
            return Err(failure("matches", "takes exactly two arguments"));
        }
        let pattern = pos_args[1].as_text().ok_or_else(|| {
            failure(
                "matches",
                format!("pattern must be text, received {}", pos_args[1].type_name()),
            )
        })?;
        let text = match &pos_args[0] {
            Value::Null => return Ok(Value::Null),
            Value::Text(text) => text,
            other => {
                return Err(failure(
                    "matches",
                    format!("expected text, received {}", other.type_name()),
                ));
            }
        };
        let re = Regex::new(pattern)
            .map_err(|e| failure("matches", format!("invalid pattern: {}", e)))?;
        Ok(Value::Integer(re.is_match(text) as i64))
    }
}

/// `count()` - number of rows in the group.
struct Count {
    rows: i64,
}

impl AggregateFunction for Count {
    fn accumulate(
        &mut self,
        _pos_args: &[Value],
        _named_args: &HashMap<String, Value>,
    ) -> Result<(), EvalError> {
        self.rows += 1;
        Ok(())
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        Ok(Value::Integer(self.rows))
    }
}

/// `sum(x)` - numeric sum over the group; nulls are skipped, and an empty
/// or all-null group sums to null.
struct Sum {
    total: Option<Value>,
}

impl AggregateFunction for Sum {
    fn accumulate(
        &mut self,
        pos_args: &[Value],
        named_args: &HashMap<String, Value>,
    ) -> Result<(), EvalError> {
        let value = single_arg("sum", pos_args, named_args)?;
        let total = match (self.total.take(), value) {
            (acc, Value::Null) => acc,
            (None, value) => Some(value.clone()),
            (Some(Value::Integer(a)), Value::Integer(b)) => Some(
                a.checked_add(*b)
                    .map(Value::Integer)
                    .ok_or_else(|| failure("sum", "integer overflow"))?,
            ),
            (Some(acc), value) => {
                let (a, b) = match (acc.as_real(), value.as_real()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => {
                        return Err(failure(
                            "sum",
                            format!("cannot sum {} values", value.type_name()),
                        ));
                    }
                };
                Some(Value::Real(a + b))
            }
        };
        self.total = total;
        Ok(())
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        Ok(self.total.clone().unwrap_or(Value::Null))
    }
}

/// `min(x)` / `max(x)` - extremum over the group; nulls are skipped.
struct Extremum {
    keep: Ordering,
    best: Option<Value>,
}

impl AggregateFunction for Extremum {
    fn accumulate(
        &mut self,
        pos_args: &[Value],
        named_args: &HashMap<String, Value>,
    ) -> Result<(), EvalError> {
        let name = if self.keep == Ordering::Less { "min" } else { "max" };
        let value = single_arg(name, pos_args, named_args)?;
        if value.is_null() {
            return Ok(());
        }
        match &self.best {
            None => self.best = Some(value.clone()),
            Some(best) => {
                let ordering = compare(value, best).ok_or_else(|| {
                    failure(
                        name,
                        format!(
                            "cannot compare {} and {}",
                            value.type_name(),
                            best.type_name()
                        ),
                    )
                })?;
                if ordering == self.keep {
                    self.best = Some(value.clone());
                }
            }
        }
        Ok(())
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        Ok(self.best.clone().unwrap_or(Value::Null))
    }
}

/// Ordering between two comparable values: numerics against numerics,
/// text against text.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => match (a.as_real(), b.as_real()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

#[test]
fn test_upper_lower() {
    let named = HashMap::new();
    let result = Upper.apply(&[Value::Text("abe".into())], &named).unwrap();
    assert_eq!(result, Value::Text("ABE".into()));
    let result = Lower.apply(&[Value::Text("ABE".into())], &named).unwrap();
    assert_eq!(result, Value::Text("abe".into()));
    assert!(Upper.apply(&[Value::Integer(1)], &named).is_err());
}

#[test]
fn test_matches_invalid_pattern_is_a_function_error() {
    let named = HashMap::new();
    let err = Matches
        .apply(
            &[Value::Text("abc".into()), Value::Text("(".into())],
            &named,
        )
        .unwrap_err();
    assert!(matches!(err, EvalError::Function { .. }));
}

#[test]
fn test_registry_resolution_is_case_insensitive() {
    let registry = FunctionRegistry::with_builtins();
    assert!(registry.resolve_scalar("UPPER").is_ok());
    assert!(matches!(
        registry.resolve_scalar("nope"),
        Err(EvalError::UnknownFunction(name)) if name == "nope"
    ));
}
