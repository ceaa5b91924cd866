//! Parent key values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier value of a parent record, as stored in a morph key column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Storage type of an entity's identifier column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    #[default]
    Integer,
    Text,
}

impl KeyType {
    /// Parse a raw key (e.g. from the command line) into a typed value
    ///
    /// # Errors
    ///
    /// Returns the parse error message when an integer key is not a valid `i64`.
    pub fn parse(self, raw: &str) -> Result<KeyValue, String> {
        match self {
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(KeyValue::Int)
                .map_err(|e| e.to_string()),
            Self::Text => Ok(KeyValue::Text(raw.to_string())),
        }
    }
}
