//! Concrete remote backends.
//!
//! [`SecretsManagerClient`] implements [`crate::client::SecretsClient`] on top
//! of AWS Secrets Manager; [`AwsClientFactory`] builds one per session.

mod secretsmanager;

pub use secretsmanager::{AwsClientFactory, LIST_SECRETS_MAX, SecretsManagerClient};

use crate::resolver::SecretResolver;

/// A resolver for one session against AWS Secrets Manager.
pub fn aws_resolver() -> SecretResolver<AwsClientFactory> {
    SecretResolver::new(AwsClientFactory)
}
