//! FILENAME: band-engine/src/aggregate.rs
//! Aggregation actions and their incremental accumulator.
//!
//! An `ObjectValue` with an action shows an aggregate over the records in
//! its band's scope: the group's partition for group bands, every record
//! for begin/summary/page bands. The accumulator feeds once per record and
//! can then answer any action, so one pass serves however many elements
//! aggregate the same attribute.

use model::value::Value;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Aggregations an `ObjectValue` can apply over its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldAction {
    /// Number of non-empty values.
    Count,
    /// Number of distinct non-empty values.
    DistinctCount,
    /// Sum of numeric values (0 when there are none).
    Sum,
    /// Mean of numeric values (empty when there are none).
    Average,
    Min,
    Max,
}

/// Incremental aggregation state over one record scope.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    count: u64,
    distinct: FxHashSet<Value>,
    sum: f64,
    numeric_count: u64,
    min: Option<Value>,
    max: Option<Value>,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    /// Feed one resolved value. Empty values do not participate in any
    /// aggregate, mirroring how a missing attribute prints nothing.
    pub fn add(&mut self, value: &Value) {
        if value.is_empty() {
            return;
        }

        self.count += 1;
        if let Some(n) = value.as_number() {
            self.sum += n;
            self.numeric_count += 1;
        }
        self.distinct.insert(value.clone());

        let is_new_min = match &self.min {
            None => true,
            Some(current) => value.compare(current) == Ordering::Less,
        };
        if is_new_min {
            self.min = Some(value.clone());
        }

        let is_new_max = match &self.max {
            None => true,
            Some(current) => value.compare(current) == Ordering::Greater,
        };
        if is_new_max {
            self.max = Some(value.clone());
        }
    }

    pub fn compute(&self, action: FieldAction) -> Value {
        match action {
            FieldAction::Count => Value::Number(self.count as f64),
            FieldAction::DistinctCount => Value::Number(self.distinct.len() as f64),
            FieldAction::Sum => Value::Number(self.sum),
            FieldAction::Average => {
                if self.numeric_count == 0 {
                    Value::Empty
                } else {
                    Value::Number(self.sum / self.numeric_count as f64)
                }
            }
            FieldAction::Min => self.min.clone().unwrap_or(Value::Empty),
            FieldAction::Max => self.max.clone().unwrap_or(Value::Empty),
        }
    }
}
