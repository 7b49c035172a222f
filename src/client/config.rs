use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::options::Options;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    Standard,
    Adaptive,
}

/// Allow-listed `retries` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: Option<u32>,
    pub mode: Option<RetryMode>,
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
}

impl RetrySettings {
    /// `true` when nothing overrides the SDK's retry defaults.
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }

    pub fn initial_backoff(&self) -> Option<Duration> {
        self.initial_backoff_ms.map(Duration::from_millis)
    }

    pub fn max_backoff(&self) -> Option<Duration> {
        self.max_backoff_ms.map(Duration::from_millis)
    }
}

/// Allow-listed `endpoint` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointSettings {
    pub url: Option<String>,
    pub use_fips: Option<bool>,
    pub use_dual_stack: Option<bool>,
}

/// Everything a [`super::ClientFactory`] needs to build a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub region: String,
    pub retries: RetrySettings,
    pub endpoint: EndpointSettings,
}

impl ClientConfig {
    /// Validates `region` and merges it with the allow-listed tuning fields.
    pub fn from_options(options: &Options) -> Result<Self> {
        let region = options.region()?.to_string();
        let retries = typed_section(options.retries(), "retries")?;
        let endpoint = typed_section(options.endpoint(), "endpoint")?;
        Ok(Self {
            region,
            retries,
            endpoint,
        })
    }
}

fn typed_section<T: serde::de::DeserializeOwned>(
    section: Map<String, Value>,
    name: &str,
) -> Result<T> {
    serde_json::from_value(Value::Object(section))
        .map_err(|e| Error::config(format!("invalid options.{name}: {e}")))
}
