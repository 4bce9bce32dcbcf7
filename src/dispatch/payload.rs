//! Request and result shapes handled by the dispatcher.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// The normalized request unit
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// One input record
    Single(Map<String, Value>),
    /// Ordered batch; each item is handed to the component as received
    Batch(Vec<Value>),
    /// Bare scalar, interpreted by the component
    Scalar(Value),
}

impl Payload {
    pub fn is_batch(&self) -> bool {
        matches!(self, Payload::Batch(_))
    }

    /// Number of component invocations this payload fans out to
    pub fn item_count(&self) -> usize {
        match self {
            Payload::Batch(items) => items.len(),
            Payload::Single(_) | Payload::Scalar(_) => 1,
        }
    }

    /// Force batch shape: a single record or scalar becomes a one-item batch
    pub fn into_batch(self) -> Vec<Value> {
        match self {
            Payload::Batch(items) => items,
            Payload::Single(record) => vec![Value::Object(record)],
            Payload::Scalar(value) => vec![value],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Single(_) => "single",
            Payload::Batch(_) => "batch",
            Payload::Scalar(_) => "scalar",
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Payload::Batch(items),
            Value::Object(record) => Payload::Single(record),
            scalar => Payload::Scalar(scalar),
        }
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Single(record) => Value::Object(record),
            Payload::Batch(items) => Value::Array(items),
            Payload::Scalar(value) => value,
        }
    }
}

/// Dispatcher output, mirroring the input shape
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Single(Value),
    Batch(Vec<Value>),
}

impl Prediction {
    pub fn into_value(self) -> Value {
        match self {
            Prediction::Single(value) => value,
            Prediction::Batch(items) => Value::Array(items),
        }
    }

    /// Results as rows; a single result becomes one row
    pub fn into_rows(self) -> Vec<Value> {
        match self {
            Prediction::Single(value) => vec![value],
            Prediction::Batch(items) => items,
        }
    }
}

impl Serialize for Prediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Prediction::Single(value) => value.serialize(serializer),
            Prediction::Batch(items) => items.serialize(serializer),
        }
    }
}
