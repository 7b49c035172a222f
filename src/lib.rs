//! Hiera-style lookup backend serving configuration keys from AWS Secrets Manager.
//!
//! A lookup key such as `db::password` becomes the secret name
//! `{uri}/db==password`. Secrets that exist are fetched once per session,
//! interpolated, decoded from JSON when possible and cached in the host's
//! session; secrets that do not exist yield [`Lookup::NotFound`].

pub mod client;
pub mod decode;
pub mod error;
pub mod index;
pub mod infra;
pub mod key;
pub mod metrics;
pub mod options;
pub mod resolver;
pub mod session;

pub use error::{Error, Result};
pub use options::Options;
pub use resolver::{Lookup, SecretResolver};
pub use session::{Interpolator, LookupContext, MemorySession};
