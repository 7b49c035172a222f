use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_sdk_secretsmanager::config::Region;

use crate::client::{ClientConfig, ClientFactory, RetryMode, RetrySettings, SecretsClient, SecretsPage};

/// Page size for `ListSecrets`; the service maximum.
pub const LIST_SECRETS_MAX: i32 = 100;

/// Reads secrets from AWS Secrets Manager.
///
/// The SDK handles retries and credentials; credentials come from the
/// ambient AWS configuration (env vars, profile, instance role).
pub struct SecretsManagerClient {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerClient {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }

    /// Builds a client for `config.region` with the tuning overrides applied.
    pub async fn connect(config: &ClientConfig) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_secretsmanager::config::Builder::from(&shared);
        if let Some(url) = config.endpoint.url.as_deref() {
            builder = builder.endpoint_url(url);
        }
        if let Some(use_fips) = config.endpoint.use_fips {
            builder = builder.use_fips(use_fips);
        }
        if let Some(use_dual_stack) = config.endpoint.use_dual_stack {
            builder = builder.use_dual_stack(use_dual_stack);
        }
        if !config.retries.is_default() {
            builder = builder.retry_config(retry_config(&config.retries));
        }

        Self::new(aws_sdk_secretsmanager::Client::from_conf(builder.build()))
    }
}

fn retry_config(settings: &RetrySettings) -> RetryConfig {
    let mut retry = match settings.mode {
        Some(RetryMode::Adaptive) => RetryConfig::adaptive(),
        Some(RetryMode::Standard) | None => RetryConfig::standard(),
    };
    if let Some(max_attempts) = settings.max_attempts {
        retry = retry.with_max_attempts(max_attempts);
    }
    if let Some(initial) = settings.initial_backoff() {
        retry = retry.with_initial_backoff(initial);
    }
    if let Some(max) = settings.max_backoff() {
        retry = retry.with_max_backoff(max);
    }
    retry
}

#[async_trait]
impl SecretsClient for SecretsManagerClient {
    async fn list_secrets(&self, page_token: Option<&str>) -> Result<SecretsPage> {
        let resp = self
            .client
            .list_secrets()
            .max_results(LIST_SECRETS_MAX)
            .set_next_token(page_token.map(str::to_string))
            .send()
            .await
            .context("Secrets Manager ListSecrets failed")?;

        let names = resp
            .secret_list()
            .iter()
            .filter_map(|entry| entry.name().map(str::to_string))
            .collect();

        Ok(SecretsPage {
            names,
            next_token: resp.next_token().map(str::to_string),
        })
    }

    /// Fetches the current version of `secret_id` as a string.
    async fn get_secret_value(&self, secret_id: &str) -> Result<String> {
        let resp = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .with_context(|| format!("Secrets Manager GetSecretValue failed for '{secret_id}'"))?;

        resp.secret_string()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("secret '{secret_id}' exists but has no string value"))
    }
}

/// [`ClientFactory`] producing [`SecretsManagerClient`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsClientFactory;

#[async_trait]
impl ClientFactory for AwsClientFactory {
    async fn connect(&self, config: &ClientConfig) -> Result<Box<dyn SecretsClient>> {
        Ok(Box::new(SecretsManagerClient::connect(config).await))
    }
}
