//! Probed sample values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single probed value.
///
/// Weather translations come back as `Text`; out-of-domain samples and
/// missing-value encounters come back as `Missing` carrying the sentinel
/// that was in force for the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Numeric(f64),
    Text(String),
    Missing {
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        repr: Option<String>,
    },
}

impl Value {
    pub fn missing(sentinel: f64) -> Self {
        Value::Missing {
            value: sentinel,
            repr: None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing { .. })
    }

    /// Numeric content, including the sentinel of a missing value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            Value::Missing { value, .. } => Some(*value),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Missing { repr, .. } => repr.as_deref(),
            Value::Numeric(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Missing { value, repr } => match repr {
                Some(s) => f.write_str(s),
                None => write!(f, "{}", value),
            },
        }
    }
}
