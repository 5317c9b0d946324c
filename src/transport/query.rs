//! Query-string encoding for structured filters.
//!
//! Primitive values are sent as their plain text form. Arrays and objects are
//! JSON-encoded into a single value under their key, so `{lat:1,lng:2,radius:5}`
//! under `location` becomes `location={"lat":1,"lng":2,"radius":5}`. Nulls are
//! dropped.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode every top-level field of a serializable filter struct.
    pub fn from_filters<T: Serialize>(filters: &T) -> Result<Self> {
        let mut params = Self::new();
        match serde_json::to_value(filters)? {
            Value::Object(map) => {
                for (key, value) in map {
                    params.insert_value(key, &value);
                }
                Ok(params)
            }
            Value::Null => Ok(params),
            other => Err(Error::validation(format!(
                "query filters must serialize to an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn push(mut self, key: impl Into<String>, value: impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        self.insert_value(key.into(), &value);
        Ok(self)
    }

    fn insert_value(&mut self, key: String, value: &Value) {
        if let Some(encoded) = encode_value(value) {
            self.pairs.push((key, encoded));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// `None` means "leave the key out".
pub fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
