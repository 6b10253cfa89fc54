//! FILENAME: grid-model/src/value.rs
//! PURPOSE: Defines the dynamically typed value stored in a row field.
//! CONTEXT: Rows arrive from the host as loosely typed records, so every
//! stage of the pipeline works on `Value` and relies on the coercions here
//! (blank test, numeric coercion, string coercion) behaving identically.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single field value of a row.
///
/// Deserialization is untagged: JSON `null`, booleans, numbers and strings map
/// onto the matching variant. Dates are never inferred from strings; hosts
/// construct `Value::Date` explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
    Date(DateTime<Utc>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for null and the empty string. These are the values the filter
    /// operators treat as "no value".
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Truthiness used when deciding whether a row carries a usable `id`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Date(_) => true,
        }
    }

    /// Numeric coercion. Unparseable text yields NaN, which compares false
    /// against everything; callers are expected to tolerate that.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Value::Date(d) => d.timestamp_millis() as f64,
        }
    }

    /// String coercion used by text filters, group keys and fallback ordering.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&d.to_rfc3339()),
        }
    }
}

/// Formats a number the way JavaScript's `String(n)` does: no trailing ".0"
/// for integral values, and exponent notation (`1e+21`, `1.5e-7`) outside
/// `[1e-6, 1e21)`.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let label = if n > 0.0 { "Infinity" } else { "-Infinity" };
        label.to_string()
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else {
        format!("{}", n)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

// ============================================================================
// HASHABLE KEY
// ============================================================================

/// Wrapper around f64 that implements Eq and Hash for use as HashMap keys.
/// NaN values are treated as equal to each other, and -0 equals 0.
#[derive(Debug, Clone, Copy)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

/// A normalized, hashable form of a `Value`, used to bucket rows by field
/// value during grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Boolean(bool),
    Number(OrderedFloat),
    Text(String),
    Date(DateTime<Utc>),
}

impl From<&Value> for ValueKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ValueKey::Null,
            Value::Boolean(b) => ValueKey::Boolean(*b),
            Value::Number(n) => ValueKey::Number(OrderedFloat(*n)),
            Value::Text(s) => ValueKey::Text(s.clone()),
            Value::Date(d) => ValueKey::Date(*d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::text("").is_blank());
        assert!(!Value::text(" ").is_blank());
        assert!(!Value::Number(0.0).is_blank());
        assert!(!Value::Boolean(false).is_blank());
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::text(" 42 ").as_number(), 42.0);
        assert_eq!(Value::text("").as_number(), 0.0);
        assert_eq!(Value::Boolean(true).as_number(), 1.0);
        assert_eq!(Value::Null.as_number(), 0.0);
        assert!(Value::text("abc").as_number().is_nan());

        let date = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(Value::Date(date).as_number(), 1000.0);
    }

    #[test]
    fn test_display_string() {
        assert_eq!(Value::Number(100000.0).to_display_string(), "100000");
        assert_eq!(Value::Number(1.5).to_display_string(), "1.5");
        assert_eq!(Value::Number(-0.0).to_display_string(), "0");
        assert_eq!(Value::Null.to_display_string(), "null");
        assert_eq!(Value::Boolean(false).to_display_string(), "false");
        assert_eq!(Value::Number(f64::NAN).to_display_string(), "NaN");
    }

    #[test]
    fn test_display_string_exponent_range() {
        assert_eq!(Value::Number(1e21).to_display_string(), "1e+21");
        assert_eq!(Value::Number(-2.5e30).to_display_string(), "-2.5e+30");
        assert_eq!(Value::Number(1e20).to_display_string(), "100000000000000000000");
        assert_eq!(Value::Number(0.000001).to_display_string(), "0.000001");
        assert_eq!(Value::Number(1.5e-7).to_display_string(), "1.5e-7");
    }

    #[test]
    fn test_value_key_equality() {
        assert_eq!(ValueKey::from(&Value::Number(0.0)), ValueKey::from(&Value::Number(-0.0)));
        assert_eq!(
            ValueKey::from(&Value::Number(f64::NAN)),
            ValueKey::from(&Value::Number(f64::NAN))
        );
        assert_ne!(ValueKey::from(&Value::Number(1.0)), ValueKey::from(&Value::text("1")));
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 3.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Null, Value::Boolean(true), Value::Number(3.5), Value::text("x")]
        );
    }
}
