//! Routes a configured value to the provider named by its reference scheme.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::{EnvProvider, SecretProvider, SecretReference, SecretsConfig, SecretsError};

/// Resolves literal values and secret references.
///
/// Values without a known scheme are literals and come back unchanged, so
/// deployments that put the header value directly in the environment keep
/// working.
pub struct SecretResolver {
    providers: HashMap<&'static str, Arc<dyn SecretProvider>>,
}

impl SecretResolver {
    /// Resolver that only understands literals and `env://` references.
    pub fn env_only() -> Self {
        Self::empty().with_provider(Arc::new(EnvProvider::new()))
    }

    fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register `provider` for its scheme, replacing any previous one.
    pub fn with_provider(mut self, provider: Arc<dyn SecretProvider>) -> Self {
        self.providers.insert(provider.scheme(), provider);
        self
    }

    /// Create a resolver for the configured provider.
    pub async fn new(config: &SecretsConfig) -> Result<Self, SecretsError> {
        let resolver = Self::env_only();

        match config.provider.as_str() {
            "env" | "" => Ok(resolver),
            #[cfg(feature = "aws")]
            "aws-sm" => {
                let provider = crate::AwsSecretsManagerProvider::from_env(
                    config.aws_region.clone(),
                    config.aws_prefix.clone(),
                )
                .await;
                Ok(resolver.with_provider(Arc::new(provider)))
            }
            other => Err(SecretsError::provider(other, "unknown secrets provider")),
        }
    }

    /// Whether `value` names a secret rather than holding it.
    pub fn is_reference(value: &str) -> bool {
        matches!(SecretReference::parse(value), Ok(Some(_)) | Err(_))
    }

    /// Resolve a configured value to its plaintext.
    pub async fn resolve(&self, value: &str) -> Result<String, SecretsError> {
        let Some(reference) = SecretReference::parse(value)? else {
            return Ok(value.to_string());
        };

        let provider = self.providers.get(reference.scheme.as_str()).ok_or_else(|| {
            SecretsError::provider(&reference.scheme, format!("not enabled for {}", reference))
        })?;

        debug!(reference = %reference, "Resolving secret reference");
        provider.fetch(&reference).await
    }
}
