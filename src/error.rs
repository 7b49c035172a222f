//! Error types surfaced to the host pipeline.
//!
//! A missing secret is *not* an error; see [`crate::resolver::Lookup::NotFound`].

/// Failures that abort a lookup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required option missing or malformed. Raised before any remote call.
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote secrets service (or its SDK) failed. Never retried here.
    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Returns `true` for [`Error::Config`].
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
