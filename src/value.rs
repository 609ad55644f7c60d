use std::fmt;

/// A runtime value in the dialect's type system.
///
/// This is the value vocabulary shared by tokens (decoded literals), insert
/// and update statements, and the row-evaluation engine. The four storage
/// datatypes (integer, real, text, blob) each have a variant, plus `Null`.
///
/// # Examples
///
/// ```
/// use sqltree::Value;
///
/// let id = Value::Integer(42);
/// let name = Value::Text("abe".to_string());
/// assert_eq!(id.type_name(), "integer");
/// assert_eq!(name.as_text(), Some("abe"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,

    /// 64-bit signed integer
    Integer(i64),

    /// Double-precision floating point number
    Real(f64),

    /// UTF-8 string
    Text(String),

    /// Raw byte string
    Blob(Vec<u8>),
}

impl Value {
    /// Human-readable name of the value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as integer; reals are not narrowed.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as float; integers widen.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(bytes) => {
                write!(f, "x'")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "'")
            }
        }
    }
}
