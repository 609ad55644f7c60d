use std::collections::{BTreeMap, HashMap};

use crate::value::Value;

/// Name-keyed value lookup, supplied per row during result iteration.
///
/// Anything that can answer "what is the value of column `name`" can back
/// the evaluation engine. Absent names return `None`; the engine turns
/// that into a lookup error rather than a silent null.
pub trait Record {
    fn get(&self, name: &str) -> Option<Value>;
}

impl Record for HashMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }
}

impl Record for BTreeMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        BTreeMap::get(self, name).cloned()
    }
}

/// JSON objects double as records, so rows can come straight from JSON
/// documents.
impl Record for serde_json::Map<String, serde_json::Value> {
    fn get(&self, name: &str) -> Option<Value> {
        serde_json::Map::get(self, name).map(value_from_json)
    }
}

/// Map a JSON value into the dialect's value space.
///
/// Booleans become 0/1 integers; nested arrays and objects carry their
/// JSON text as a text value.
pub fn value_from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(flag) => Value::Integer(*flag as i64),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(n) => Value::Integer(n),
            None => match number.as_f64() {
                Some(n) => Value::Real(n),
                None => Value::Null,
            },
        },
        serde_json::Value::String(text) => Value::Text(text.clone()),
        other => Value::Text(other.to_string()),
    }
}

#[test]
fn test_json_record_lookup() {
    let json: serde_json::Value =
        serde_json::from_str(r#"{"id": 5, "name": "abe", "score": 1.5, "gone": null}"#).unwrap();
    let record = json.as_object().unwrap();
    assert_eq!(Record::get(record, "id"), Some(Value::Integer(5)));
    assert_eq!(Record::get(record, "name"), Some(Value::Text("abe".into())));
    assert_eq!(Record::get(record, "score"), Some(Value::Real(1.5)));
    assert_eq!(Record::get(record, "gone"), Some(Value::Null));
    assert_eq!(Record::get(record, "missing"), None);
}
