//! Key lookup against the remote secrets service.
//!
//! One [`SecretResolver`] serves one lookup session. It builds the remote
//! client on first need, lists all secret names once, and leaves value
//! caching to the host's [`LookupContext`].

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{Span, debug, info};

use crate::client::{ClientConfig, ClientFactory, Instrumented, SecretsClient};
use crate::decode::decode_secret;
use crate::error::Result;
use crate::index::SecretsIndex;
use crate::key::secret_name;
use crate::metrics::SecretsMetrics;
use crate::options::Options;
use crate::session::LookupContext;

/// Outcome of a lookup. `NotFound` lets the host try its next provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Value),
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

pub struct SecretResolver<F> {
    factory: F,
    metrics: Option<SecretsMetrics>,
    client: OnceCell<Box<dyn SecretsClient>>,
    index: OnceCell<SecretsIndex>,
}

impl<F: ClientFactory> SecretResolver<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            metrics: None,
            client: OnceCell::new(),
            index: OnceCell::new(),
        }
    }

    /// Records request metrics into `metrics` instead of the process-wide
    /// collectors when `statsd` is enabled.
    pub fn with_metrics(mut self, metrics: SecretsMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Resolves `key` to a decoded secret value.
    ///
    /// Cached values are served without remote calls. A key whose secret is
    /// not in the index yields [`Lookup::NotFound`], never an error.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] if `uri` (or, once a client is needed,
    /// `region`) is missing; [`crate::Error::Remote`] if the service fails.
    #[tracing::instrument(skip(self, options, ctx), fields(secret_name = tracing::field::Empty))]
    pub async fn resolve<X>(&self, key: &str, options: &Options, ctx: &mut X) -> Result<Lookup>
    where
        X: LookupContext + ?Sized,
    {
        let uri = options.uri()?;
        let name = secret_name(uri, key);
        Span::current().record("secret_name", name.as_str());

        if ctx.has(&name) {
            if let Some(value) = ctx.get(&name) {
                debug!("Session cache hit");
                return Ok(Lookup::Found(value));
            }
        }

        if !self.exists(&name, options).await? {
            debug!("Secret not in index");
            return Ok(Lookup::NotFound);
        }

        let raw = self.client(options).await?.get_secret_value(&name).await?;
        let value = decode_secret(&ctx.interpolate(&raw));
        ctx.put(&name, value.clone());

        debug!("Secret resolved");
        Ok(Lookup::Found(value))
    }

    /// Whether `name` is in the session's secrets index.
    pub async fn exists(&self, name: &str, options: &Options) -> Result<bool> {
        Ok(self.index(options).await?.contains(name))
    }

    /// The secrets index, loaded on first call.
    pub async fn index(&self, options: &Options) -> Result<&SecretsIndex> {
        self.index
            .get_or_try_init(|| async {
                let client = self.client(options).await?;
                Ok::<_, crate::Error>(SecretsIndex::load(client).await?)
            })
            .await
    }

    /// The session's client, built on first call.
    pub async fn client(&self, options: &Options) -> Result<&dyn SecretsClient> {
        let client = self
            .client
            .get_or_try_init(|| self.connect(options))
            .await?;
        Ok(client.as_ref())
    }

    #[tracing::instrument(skip_all)]
    async fn connect(&self, options: &Options) -> Result<Box<dyn SecretsClient>> {
        let config = ClientConfig::from_options(options)?;
        let client = self.factory.connect(&config).await?;
        info!(region = %config.region, statsd = options.statsd(), "Secrets client created");

        if !options.statsd() {
            return Ok(client);
        }
        let metrics = match &self.metrics {
            Some(metrics) => Some(metrics.clone()),
            None => SecretsMetrics::global().cloned(),
        };
        let client: Box<dyn SecretsClient> = match metrics {
            Some(metrics) => Box::new(Instrumented::new(client, metrics)),
            None => client,
        };
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SecretsPage;
    use crate::session::MemorySession;
    use async_trait::async_trait;
    use serde_json::json;

    struct Unreachable;

    #[async_trait]
    impl ClientFactory for Unreachable {
        async fn connect(&self, _config: &ClientConfig) -> anyhow::Result<Box<dyn SecretsClient>> {
            anyhow::bail!("no client in this test")
        }
    }

    struct OneSecret;

    #[async_trait]
    impl SecretsClient for OneSecret {
        async fn list_secrets(&self, _page_token: Option<&str>) -> anyhow::Result<SecretsPage> {
            Ok(SecretsPage {
                names: vec!["p/k".into()],
                next_token: None,
            })
        }

        async fn get_secret_value(&self, _secret_id: &str) -> anyhow::Result<String> {
            Ok(r#"{"user": "%{who}"}"#.into())
        }
    }

    struct OneSecretFactory;

    #[async_trait]
    impl ClientFactory for OneSecretFactory {
        async fn connect(&self, _config: &ClientConfig) -> anyhow::Result<Box<dyn SecretsClient>> {
            Ok(Box::new(OneSecret))
        }
    }

    #[test]
    fn test_lookup_accessors() {
        let found = Lookup::Found(json!(1));
        assert!(found.is_found());
        assert_eq!(found.value(), Some(&json!(1)));
        assert_eq!(Lookup::NotFound.into_value(), None);
    }

    #[tokio::test]
    async fn test_cached_value_skips_client() {
        let resolver = SecretResolver::new(Unreachable);
        let options = Options::default().with("uri", "p");
        let mut session = MemorySession::new();
        session.put("p/a=b", json!("cached"));

        let lookup = resolver.resolve("a:b", &options, &mut session).await.unwrap();
        assert_eq!(lookup, Lookup::Found(json!("cached")));
    }

    #[tokio::test]
    async fn test_factory_failure_is_remote_error() {
        let resolver = SecretResolver::new(Unreachable);
        let options = Options::default().with("uri", "p").with("region", "us-east-1");

        let err = resolver
            .resolve("k", &options, &mut MemorySession::new())
            .await
            .unwrap_err();
        assert!(!err.is_config());
    }

    #[tokio::test]
    async fn test_interpolates_inside_json() {
        let resolver = SecretResolver::new(OneSecretFactory);
        let options = Options::default().with("uri", "p").with("region", "us-east-1");
        let mut interp = crate::session::Interpolator::default();
        interp.set("who", "admin");
        let mut session = MemorySession::with_interpolator(interp);

        let lookup = resolver.resolve("k", &options, &mut session).await.unwrap();
        assert_eq!(lookup, Lookup::Found(json!({"user": "admin"})));
        assert!(session.has("p/k"));
    }

    #[tokio::test]
    async fn test_statsd_wraps_client() {
        let metrics = SecretsMetrics::new().unwrap();
        let resolver = SecretResolver::new(OneSecretFactory).with_metrics(metrics.clone());
        let options = Options::default()
            .with("uri", "p")
            .with("region", "us-east-1")
            .with("statsd", true);

        resolver
            .resolve("k", &options, &mut MemorySession::new())
            .await
            .unwrap();

        assert_eq!(metrics.request_count(crate::metrics::OP_LIST_SECRETS), 1);
        assert_eq!(metrics.request_count(crate::metrics::OP_GET_SECRET_VALUE), 1);
    }
}
