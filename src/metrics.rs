//! Prometheus metrics for remote secrets requests.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

pub const REQUESTS_TOTAL: &str = "hiera_secretsmanager_requests_total";
pub const REQUEST_DURATION: &str = "hiera_secretsmanager_request_duration_seconds";

pub const OP_LIST_SECRETS: &str = "list_secrets";
pub const OP_GET_SECRET_VALUE: &str = "get_secret_value";

static GLOBAL: OnceLock<Option<SecretsMetrics>> = OnceLock::new();

/// Request counter and duration histogram, labelled by operation.
#[derive(Clone)]
pub struct SecretsMetrics {
    requests: CounterVec,
    duration: HistogramVec,
}

impl SecretsMetrics {
    /// Creates unregistered collectors.
    pub fn new() -> prometheus::Result<Self> {
        let requests = CounterVec::new(
            Opts::new(REQUESTS_TOTAL, "Total number of secrets service requests"),
            &["operation"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(REQUEST_DURATION, "Secrets service request duration in seconds"),
            &["operation"],
        )?;
        Ok(Self { requests, duration })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.requests.clone()))?;
        registry.register(Box::new(self.duration.clone()))?;
        Ok(())
    }

    /// Process-wide collectors in the default registry.
    ///
    /// Registration happens at most once; `None` if it failed.
    pub fn global() -> Option<&'static SecretsMetrics> {
        GLOBAL
            .get_or_init(|| {
                let metrics = SecretsMetrics::new().and_then(|metrics| {
                    metrics.register(prometheus::default_registry())?;
                    Ok(metrics)
                });
                match metrics {
                    Ok(metrics) => Some(metrics),
                    Err(e) => {
                        warn!(error = %e, "Metrics registration failed, request metrics disabled");
                        None
                    }
                }
            })
            .as_ref()
    }

    pub fn observe(&self, operation: &str, elapsed: Duration) {
        self.requests.with_label_values(&[operation]).inc();
        self.duration
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }

    /// Requests recorded so far for `operation`.
    pub fn request_count(&self, operation: &str) -> u64 {
        self.requests.with_label_values(&[operation]).get() as u64
    }

    /// Duration samples recorded so far for `operation`.
    pub fn duration_samples(&self, operation: &str) -> u64 {
        self.duration
            .with_label_values(&[operation])
            .get_sample_count()
    }
}

/// Text exposition of the default registry.
pub fn render_global() -> anyhow::Result<String> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buf = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
