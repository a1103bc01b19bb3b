//! Untyped data objects backed by JSON values.

use std::rc::Rc;

use serde_json::Value as JsonValue;

use crate::data_source::DataSource;
use crate::error::RenderResult;
use crate::provider::format::format_scalar;
use crate::value::{DataObject, Value};

/// A named JSON payload exposed as a data object.
///
/// Object fields are members; arrays expose `Count` and `Length`. Nested
/// objects become records themselves, so `Order.Customer.Name` walks down
/// the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    value: JsonValue,
}

impl Record {
    pub fn new(name: impl Into<String>, value: JsonValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &JsonValue {
        &self.value
    }

    /// Store the record in `data` under its own name.
    pub fn install(self, data: &DataSource) {
        data.set_shared(Rc::new(self));
    }
}

impl DataObject for Record {
    fn type_key(&self) -> String {
        self.name.clone()
    }

    fn member(&self, name: &str) -> Option<Value<'static>> {
        match &self.value {
            JsonValue::Object(map) => map.get(name).map(|v| json_to_value(name, v)),
            JsonValue::Array(items) if matches!(name, "Count" | "Length") => {
                Some(Value::Integer(items.len() as i64))
            }
            _ => None,
        }
    }

    fn to_text(&self, format: Option<&str>) -> RenderResult<String> {
        match &self.value {
            JsonValue::Object(_) | JsonValue::Array(_) => Ok(self.value.to_string()),
            scalar => format_scalar(&json_to_value(&self.name, scalar), format),
        }
    }
}

/// Convert a JSON value into a render value.
///
/// Objects become nested [`Record`]s named after their key; arrays become
/// lists.
pub fn json_to_value(name: &str, value: &JsonValue) -> Value<'static> {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or_default()),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(items) => {
            Value::List(items.iter().map(|item| json_to_value(name, item)).collect())
        }
        JsonValue::Object(_) => Value::object(Record::new(name, value.clone())),
    }
}

/// Split a top-level JSON object into one record per key.
///
/// Any other JSON value becomes a single record called `name`.
pub fn records_from(name: &str, value: JsonValue) -> Vec<Record> {
    match value {
        JsonValue::Object(map) => map
            .into_iter()
            .map(|(key, value)| Record::new(key, value))
            .collect(),
        other => vec![Record::new(name, other)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolver;
    use serde_json::json;

    #[test]
    fn test_members() {
        let record = Record::new(
            "Order",
            json!({"Id": 7, "Total": 12.5, "Paid": true, "Lines": [1, 2, 3], "Note": null}),
        );
        assert!(matches!(record.member("Id"), Some(Value::Integer(7))));
        assert!(matches!(record.member("Total"), Some(Value::Float(x)) if x == 12.5));
        assert!(matches!(record.member("Paid"), Some(Value::Bool(true))));
        assert!(matches!(record.member("Lines"), Some(Value::List(ref l)) if l.len() == 3));
        assert!(matches!(record.member("Note"), Some(Value::Null)));
        assert!(record.member("Missing").is_none());
    }

    #[test]
    fn test_nested_members_through_data_source() {
        let data = DataSource::new();
        Record::new("Order", json!({"Customer": {"Name": "Ada"}})).install(&data);

        let resolver = Resolver::root(&data);
        let name = resolver.resolve("Order.Customer.Name").unwrap();
        assert_eq!(name.as_text(), Some("Ada"));
    }

    #[test]
    fn test_array_count() {
        let record = Record::new("Lines", json!(["a", "b"]));
        assert!(matches!(record.member("Count"), Some(Value::Integer(2))));
        assert_eq!(record.to_text(None).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn test_records_from() {
        let mut records = records_from("data", json!({"A": 1, "B": {"x": 2}}));
        records.sort_by(|a, b| a.name().cmp(b.name()));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), "A");
        assert_eq!(records[0].to_text(None).unwrap(), "1");
        assert_eq!(records[1].name(), "B");

        let records = records_from("data", json!("hello"));
        assert_eq!(records[0].name(), "data");
        assert_eq!(records[0].to_text(None).unwrap(), "hello");
    }
}
