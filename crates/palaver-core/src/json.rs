//! Tagged shape decode for parsed JSON.
//!
//! Extraction logic constantly needs to know whether a freshly parsed value
//! is an object, an array, or a scalar. Rather than scattering
//! `is_object()` / `is_array()` checks through the extractor, every parse
//! is immediately decoded into a [`JsonShape`] and pattern-matched
//! exhaustively.

use serde_json::{Map, Value};

/// The top-level shape of a parsed JSON value.
#[derive(Clone, Debug, PartialEq)]
pub enum JsonShape {
    /// A string, number, boolean, or null.
    Scalar(Value),
    /// A JSON object.
    Object(Map<String, Value>),
    /// A JSON array.
    Array(Vec<Value>),
}

impl JsonShape {
    /// Parse a string as JSON and decode its shape.
    pub fn parse(s: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_value(serde_json::from_str(s)?))
    }

    /// Decode the shape of an already-parsed value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Array(items),
            scalar => Self::Scalar(scalar),
        }
    }

    /// Return the object payload, if this is an object.
    #[must_use]
    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            Self::Scalar(_) | Self::Array(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
