//! `env://NAME` references

use async_trait::async_trait;

use crate::{SecretProvider, SecretReference, SecretsError};

/// Reads references from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvProvider;

impl EnvProvider {
    pub fn new() -> Self {
        Self
    }

    /// `-` and `.` are not portable in variable names.
    fn variable_name(name: &str) -> String {
        name.replace(['-', '.'], "_")
    }
}

#[async_trait]
impl SecretProvider for EnvProvider {
    async fn fetch(&self, reference: &SecretReference) -> Result<String, SecretsError> {
        let variable = Self::variable_name(&reference.name);
        std::env::var(&variable).map_err(|_| SecretsError::NotFound(reference.to_string()))
    }

    fn scheme(&self) -> &'static str {
        SecretReference::ENV
    }
}
