//! `aws-sm://` references backed by AWS Secrets Manager.
//!
//! Secrets stored as JSON key/value pairs (the console default) are read
//! one field at a time with `aws-sm://name#field`.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::{SecretProvider, SecretReference, SecretsError};

pub struct AwsSecretsManagerProvider {
    client: Client,
    prefix: String,
}

impl AwsSecretsManagerProvider {
    pub fn new(client: Client, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    /// Build a client from the standard AWS SDK chain.
    pub async fn from_env(region: Option<String>, prefix: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        let prefix = prefix.unwrap_or_default();
        info!(prefix = %prefix, "Secrets Manager provider ready");
        Self::new(Client::new(&config), prefix)
    }
}

#[async_trait]
impl SecretProvider for AwsSecretsManagerProvider {
    async fn fetch(&self, reference: &SecretReference) -> Result<String, SecretsError> {
        let secret_id = format!("{}{}", self.prefix, reference.name);
        debug!(reference = %reference, "Fetching secret");

        let output = self.client
            .get_secret_value()
            .secret_id(&secret_id)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception());
                if not_found {
                    SecretsError::NotFound(reference.to_string())
                } else {
                    SecretsError::provider(self.scheme(), DisplayErrorContext(&e).to_string())
                }
            })?;

        let secret = output.secret_string().ok_or_else(|| {
            SecretsError::provider(self.scheme(), format!("{} has no string value", reference))
        })?;

        match &reference.field {
            Some(field) => select_field(secret, field, reference),
            None => Ok(secret.to_string()),
        }
    }

    fn scheme(&self) -> &'static str {
        SecretReference::AWS_SM
    }
}

fn select_field(secret: &str, field: &str, reference: &SecretReference) -> Result<String, SecretsError> {
    let doc: Value = serde_json::from_str(secret).map_err(|_| {
        SecretsError::InvalidReference(format!("{} is not a JSON secret", reference))
    })?;

    match doc.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(SecretsError::NotFound(format!("{}#{}", reference, field))),
        Some(other) => Ok(other.to_string()),
    }
}
