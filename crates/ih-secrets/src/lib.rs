//! idhook Secrets Management
//!
//! Resolves configuration values that may be secret references:
//! - plain literal values are returned unchanged
//! - `env://NAME` reads the process environment
//! - `aws-sm://secret-name` reads AWS Secrets Manager (feature `aws`)
//! - `aws-sm://secret-name#field` reads one field of a JSON secret

use async_trait::async_trait;
use thiserror::Error;

mod env;
mod reference;
mod resolver;

pub use env::EnvProvider;
pub use reference::SecretReference;
pub use resolver::SecretResolver;

#[cfg(feature = "aws")]
mod aws;
#[cfg(feature = "aws")]
pub use aws::AwsSecretsManagerProvider;

#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Invalid secret reference: {0}")]
    InvalidReference(String),

    #[error("Secret provider {provider} failed: {message}")]
    Provider { provider: String, message: String },
}

impl SecretsError {
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        SecretsError::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

/// Where secret references are resolved
#[derive(Debug, Clone, Default)]
pub struct SecretsConfig {
    /// Provider type: env, aws-sm
    pub provider: String,
    /// AWS region (SDK default chain when unset)
    pub aws_region: Option<String>,
    /// Prepended to every Secrets Manager name, e.g. "idhook/prod/"
    pub aws_prefix: Option<String>,
}

/// Backend able to look up a secret by name.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Plaintext for `reference`, including field selection if requested.
    async fn fetch(&self, reference: &SecretReference) -> Result<String, SecretsError>;

    /// Scheme this provider answers, without `://`.
    fn scheme(&self) -> &'static str;
}
