//! FILENAME: model/src/value.rs
//! PURPOSE: Defines the dynamic value type carried by report records.
//! CONTEXT: This file contains the `Value` enum, the unit of data that flows
//! from input records through band elements to rendered output. It must be
//! usable as a grouping key, so equality and hashing are total (NaN included).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A single attribute value taken from a record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum Value {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Numeric view of the value, used by sum/average style aggregations.
    /// Text and booleans do not coerce; only real numbers participate.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the display form of the value as a String.
    /// This is what elements render when no explicit format is set.
    pub fn display(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            Value::Text(s) => s.clone(),
            Value::Boolean(b) => {
                if *b { "true" } else { "false" }.to_string()
            }
            Value::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }

    /// Total ordering across value types, used when sorting group keys and
    /// by min/max aggregations. Empty sorts first, then numbers, text,
    /// booleans and datetimes.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Empty, Value::Empty) => Ordering::Equal,
            (Value::Empty, _) => Ordering::Less,
            (_, Value::Empty) => Ordering::Greater,

            (Value::Number(na), Value::Number(nb)) => match na.partial_cmp(nb) {
                Some(ordering) => ordering,
                // NaN ranks above every number; all NaNs tie, matching `Eq`.
                None => na.is_nan().cmp(&nb.is_nan()),
            },
            (Value::Number(_), _) => Ordering::Less,
            (_, Value::Number(_)) => Ordering::Greater,

            (Value::Text(ta), Value::Text(tb)) => ta.cmp(tb),
            (Value::Text(_), _) => Ordering::Less,
            (_, Value::Text(_)) => Ordering::Greater,

            (Value::Boolean(ba), Value::Boolean(bb)) => ba.cmp(bb),
            (Value::Boolean(_), _) => Ordering::Less,
            (_, Value::Boolean(_)) => Ordering::Greater,

            (Value::DateTime(da), Value::DateTime(db)) => da.cmp(db),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Number(a), Value::Number(b)) => {
                // NaN values are treated as equal so they can group together
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Empty => {}
            Value::Number(n) => {
                if n.is_nan() {
                    // All NaN values hash to the same thing
                    u64::MAX.hash(state);
                } else {
                    n.to_bits().hash(state);
                }
            }
            Value::Text(s) => s.hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::DateTime(dt) => dt.hash(state),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_values() {
        assert_eq!(Value::Empty.display(), "");
        assert_eq!(Value::Number(42.0).display(), "42");
        assert_eq!(Value::Number(3.5).display(), "3.5");
        assert_eq!(Value::Text("Chair".to_string()).display(), "Chair");
        assert_eq!(Value::Boolean(true).display(), "true");
    }

    #[test]
    fn test_nan_groups_with_nan() {
        let a = Value::Number(f64::NAN);
        let b = Value::Number(f64::NAN);
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_compare_ranks_types() {
        assert_eq!(
            Value::Empty.compare(&Value::Number(1.0)),
            Ordering::Less
        );
        assert_eq!(
            Value::Number(2.0).compare(&Value::Text("a".to_string())),
            Ordering::Less
        );
        assert_eq!(
            Value::Number(2.0).compare(&Value::Number(1.0)),
            Ordering::Greater
        );
        assert_eq!(
            Value::Text("a".to_string()).compare(&Value::Text("b".to_string())),
            Ordering::Less
        );
    }

    #[test]
    fn test_nan_ranks_above_numbers() {
        let nan = Value::Number(f64::NAN);
        assert_eq!(nan.compare(&Value::Number(2.0)), Ordering::Greater);
        assert_eq!(Value::Number(2.0).compare(&nan), Ordering::Less);
        assert_eq!(nan.compare(&Value::Number(f64::NAN)), Ordering::Equal);
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(3), Value::Number(3.0));
        assert_eq!(Value::from("x"), Value::Text("x".to_string()));
        assert_eq!(Value::from(None::<f64>), Value::Empty);
        assert_eq!(Value::from(Some(2.0)), Value::Number(2.0));
    }
}
