//! FILENAME: model/src/record.rs
//! PURPOSE: Defines the flat record type reports are rendered against.
//! CONTEXT: A record is one row of input data, a map from attribute name to
//! `Value`. Reports never reach back into a database or object graph; whatever
//! query produced the data hands over records in the order they should print.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One input row: attribute name to value.
///
/// Attribute names are plain keys. A name like `"category.name"` is an
/// ordinary key, not a traversal; flatten nested data before rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    attributes: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style insert, convenient when constructing records in code.
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(attribute.into(), value.into());
        self
    }

    pub fn set(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(attribute.into(), value.into());
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    /// Value for an attribute, `Value::Empty` when the record lacks it.
    /// Missing attributes are not an error; bands simply print nothing.
    pub fn value(&self, attribute: &str) -> Value {
        self.attributes
            .get(attribute)
            .cloned()
            .unwrap_or(Value::Empty)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Record {
            attributes: iter.into_iter().collect(),
        }
    }
}
