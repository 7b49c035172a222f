//! The slice of the host lookup context this backend depends on.
//!
//! [`LookupContext`] is everything the resolver needs from the host: a
//! session-scoped value cache and string interpolation. [`MemorySession`]
//! is a self-contained implementation for the CLI and tests.

use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Host-provided, session-scoped cache plus interpolation.
///
/// A context belongs to exactly one lookup session and is never shared
/// between threads while a lookup is running.
pub trait LookupContext {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&mut self, key: &str, value: Value);
    /// Substitutes host variables in a raw secret string.
    fn interpolate(&self, raw: &str) -> String;
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{([^}]*)\}").expect("placeholder pattern is valid"));

/// Replaces `%{name}` placeholders with values from a variable map.
///
/// Unknown variables interpolate to the empty string.
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
    vars: HashMap<String, String>,
}

impl Interpolator {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn interpolate(&self, raw: &str) -> String {
        if !raw.contains("%{") {
            return raw.to_string();
        }
        PLACEHOLDER
            .replace_all(raw, |caps: &Captures| {
                self.vars
                    .get(caps[1].trim())
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

/// In-memory [`LookupContext`]; dropping it ends the session.
#[derive(Debug, Default)]
pub struct MemorySession {
    cache: HashMap<String, Value>,
    interpolator: Interpolator,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interpolator(interpolator: Interpolator) -> Self {
        Self {
            cache: HashMap::new(),
            interpolator,
        }
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl LookupContext for MemorySession {
    fn has(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.cache.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: Value) {
        self.cache.insert(key.to_string(), value);
    }

    fn interpolate(&self, raw: &str) -> String {
        self.interpolator.interpolate(raw)
    }
}
