//! Backend options as handed over by the host pipeline.
//!
//! The options block is a plain JSON object, e.g. from `hiera.yaml`:
//! ```json
//! {
//!   "uri": "app/secret/path",
//!   "region": "us-east-1",
//!   "statsd": true,
//!   "retries": { "max_attempts": 5 },
//!   "endpoint": { "url": "http://localhost:4566" }
//! }
//! ```

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{Error, Result};

/// Retry tuning fields passed through to the SDK client.
pub const RETRY_KEYS: &[&str] = &["max_attempts", "mode", "initial_backoff_ms", "max_backoff_ms"];

/// Endpoint tuning fields passed through to the SDK client.
pub const ENDPOINT_KEYS: &[&str] = &["url", "use_fips", "use_dual_stack"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    entries: Map<String, Value>,
}

impl Options {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Builds options from any JSON value; only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(Error::config(format!(
                "options must be a mapping, got {other}"
            ))),
        }
    }

    /// Loads the options block from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read options file '{}': {e}", path.display()))
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| {
            Error::config(format!("invalid options file '{}': {e}", path.display()))
        })?;
        Self::from_value(value)
    }

    /// Returns a copy with `key` set to `value`.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// The secret-name prefix. Required for every lookup.
    pub fn uri(&self) -> Result<&str> {
        self.required_str("uri")
    }

    /// The remote service region. Required once a client has to be built.
    pub fn region(&self) -> Result<&str> {
        self.required_str("region")
    }

    /// Whether request metrics are enabled. Accepts `true` or `"true"`.
    pub fn statsd(&self) -> bool {
        match self.entries.get("statsd") {
            Some(Value::Bool(enabled)) => *enabled,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    /// The allow-listed part of the `retries` sub-mapping.
    pub fn retries(&self) -> Map<String, Value> {
        allowed_subset(self.entries.get("retries"), RETRY_KEYS)
    }

    /// The allow-listed part of the `endpoint` sub-mapping.
    pub fn endpoint(&self) -> Map<String, Value> {
        allowed_subset(self.entries.get("endpoint"), ENDPOINT_KEYS)
    }

    fn required_str(&self, key: &str) -> Result<&str> {
        match self.entries.get(key) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(Error::config(format!(
                "options.{key} must be a string, got {other}"
            ))),
            None => Err(Error::config(format!(
                "hiera_secretsmanager requires options.{key} to be set in hiera.yaml"
            ))),
        }
    }
}

/// Keeps only the `allowed` keys of a sub-mapping. Anything that is not a
/// mapping yields an empty map; unknown keys are dropped silently.
pub fn allowed_subset(section: Option<&Value>, allowed: &[&str]) -> Map<String, Value> {
    let Some(Value::Object(map)) = section else {
        return Map::new();
    };
    map.iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
