use anyhow::Result;
use async_trait::async_trait;
use std::time::Instant;

use super::{SecretsClient, SecretsPage};
use crate::metrics::{OP_GET_SECRET_VALUE, OP_LIST_SECRETS, SecretsMetrics};

/// A [`SecretsClient`] wrapper that counts and times every request.
///
/// Failed requests are recorded too.
pub struct Instrumented<C> {
    pub inner: C,
    pub metrics: SecretsMetrics,
}

impl<C> Instrumented<C> {
    pub fn new(inner: C, metrics: SecretsMetrics) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl<C: SecretsClient> SecretsClient for Instrumented<C> {
    async fn list_secrets(&self, page_token: Option<&str>) -> Result<SecretsPage> {
        let start = Instant::now();
        let result = self.inner.list_secrets(page_token).await;
        self.metrics.observe(OP_LIST_SECRETS, start.elapsed());
        result
    }

    async fn get_secret_value(&self, secret_id: &str) -> Result<String> {
        let start = Instant::now();
        let result = self.inner.get_secret_value(secret_id).await;
        self.metrics.observe(OP_GET_SECRET_VALUE, start.elapsed());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl SecretsClient for Fixed {
        async fn list_secrets(&self, _page_token: Option<&str>) -> Result<SecretsPage> {
            Ok(SecretsPage {
                names: vec!["a".into()],
                next_token: None,
            })
        }

        async fn get_secret_value(&self, _secret_id: &str) -> Result<String> {
            anyhow::bail!("access denied")
        }
    }

    #[tokio::test]
    async fn test_records_success_and_failure() {
        let client = Instrumented::new(Fixed, SecretsMetrics::new().unwrap());

        let page = client.list_secrets(None).await.unwrap();
        assert_eq!(page.names, vec!["a".to_string()]);
        assert!(client.get_secret_value("a").await.is_err());

        assert_eq!(client.metrics.request_count(OP_LIST_SECRETS), 1);
        assert_eq!(client.metrics.request_count(OP_GET_SECRET_VALUE), 1);
        assert_eq!(client.metrics.duration_samples(OP_GET_SECRET_VALUE), 1);
    }
}
