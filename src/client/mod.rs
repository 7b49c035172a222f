//! Remote secrets client abstraction.
//!
//! [`SecretsClient`] is the two-call surface the resolver consumes.
//! [`ClientFactory`] turns a validated [`ClientConfig`] into a client.
//! [`Instrumented`] wraps any client with request metrics.

mod config;
mod instrumented;

pub use config::{ClientConfig, EndpointSettings, RetryMode, RetrySettings};
pub use instrumented::Instrumented;

use anyhow::Result;
use async_trait::async_trait;

/// One page of the remote secrets listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretsPage {
    pub names: Vec<String>,
    /// Token for the following page; `None` on the last page.
    pub next_token: Option<String>,
}

/// The remote secrets service. Retry, auth and transport live behind it.
#[async_trait]
pub trait SecretsClient: Send + Sync {
    async fn list_secrets(&self, page_token: Option<&str>) -> Result<SecretsPage>;

    async fn get_secret_value(&self, secret_id: &str) -> Result<String>;
}

#[async_trait]
impl<C: SecretsClient + ?Sized> SecretsClient for Box<C> {
    async fn list_secrets(&self, page_token: Option<&str>) -> Result<SecretsPage> {
        (**self).list_secrets(page_token).await
    }

    async fn get_secret_value(&self, secret_id: &str) -> Result<String> {
        (**self).get_secret_value(secret_id).await
    }
}

/// Builds a [`SecretsClient`] for one lookup session.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, config: &ClientConfig) -> Result<Box<dyn SecretsClient>>;
}
