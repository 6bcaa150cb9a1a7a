use std::fmt;

use crate::SecretsError;

/// A parsed `scheme://name[#field]` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReference {
    pub scheme: String,
    pub name: String,
    pub field: Option<String>,
}

impl SecretReference {
    pub const ENV: &'static str = "env";
    pub const AWS_SM: &'static str = "aws-sm";

    const KNOWN: [&'static str; 2] = [Self::ENV, Self::AWS_SM];

    /// Parse a configured value.
    ///
    /// Returns `Ok(None)` for literals, i.e. anything without a known scheme.
    pub fn parse(value: &str) -> Result<Option<Self>, SecretsError> {
        let Some((scheme, rest)) = value.split_once("://") else {
            return Ok(None);
        };
        if !Self::KNOWN.contains(&scheme) {
            return Ok(None);
        }

        let (name, field) = match rest.split_once('#') {
            Some((name, field)) => (name, Some(field)),
            None => (rest, None),
        };
        if name.is_empty() || field.is_some_and(str::is_empty) {
            return Err(SecretsError::InvalidReference(Self::mask(value)));
        }
        if scheme == Self::ENV && field.is_some() {
            return Err(SecretsError::InvalidReference(format!(
                "{} (env references cannot select a field)",
                Self::mask(value)
            )));
        }

        Ok(Some(Self {
            scheme: scheme.to_string(),
            name: name.to_string(),
            field: field.map(str::to_string),
        }))
    }

    /// Keep the scheme and the first characters of a reference for logs.
    pub fn mask(value: &str) -> String {
        match value.split_once("://") {
            Some((scheme, rest)) => {
                let visible: String = rest.chars().take(4).collect();
                format!("{}://{}***", scheme, visible)
            }
            None => "***".to_string(),
        }
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.name.chars().take(4).collect();
        write!(f, "{}://{}***", self.scheme, visible)
    }
}
