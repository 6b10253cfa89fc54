//! FILENAME: grid-model/src/row.rs
//! PURPOSE: Defines a record of the dataset being displayed.
//! CONTEXT: A row is an opaque field-name -> value mapping. The pipeline
//! only ever reads rows; hosts build them once and hand out references.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Field consulted for row identity.
pub const ROW_ID_FIELD: &str = "id";

static NULL: Value = Value::Null;

/// One record of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: FxHashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Row {
            fields: FxHashMap::default(),
        }
    }

    /// Builder-style insert, convenient for constructing fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the raw field value, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the raw field value, treating an absent field as null.
    pub fn value(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Derives the identity of a row: the string form of its `id` field when
/// that value is truthy, otherwise the positional fallback `row-<index>`.
pub fn row_id(row: &Row, index: usize) -> String {
    match row.get(ROW_ID_FIELD) {
        Some(id) if id.is_truthy() => id.to_display_string(),
        _ => format!("row-{}", index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_field_reads_as_null() {
        let row = Row::new().with("name", "Ada");
        assert_eq!(row.value("name"), &Value::text("Ada"));
        assert_eq!(row.value("missing"), &Value::Null);
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_row_id_fallback() {
        let with_id = Row::new().with("id", 7);
        let zero_id = Row::new().with("id", 0);
        let empty_id = Row::new().with("id", "");
        let no_id = Row::new().with("name", "x");

        assert_eq!(row_id(&with_id, 3), "7");
        assert_eq!(row_id(&zero_id, 3), "row-3");
        assert_eq!(row_id(&empty_id, 4), "row-4");
        assert_eq!(row_id(&no_id, 0), "row-0");
    }

    #[test]
    fn test_row_json_is_a_plain_object() {
        let row: Row = serde_json::from_str(r#"{"dept":"Eng","salary":100000}"#).unwrap();
        assert_eq!(row.value("dept"), &Value::text("Eng"));
        assert_eq!(row.value("salary"), &Value::Number(100000.0));
        assert_eq!(row.len(), 2);
    }
}
