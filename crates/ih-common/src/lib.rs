use serde::{Deserialize, Serialize};

pub mod logging;

/// Error body returned to the invoking runtime.
///
/// Uses the same field names a function runtime reports for a failed
/// invocation, so callers that already parse those errors can read ours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_type: String,
    pub error_message: String,
}

impl ErrorBody {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            error_message: error_message.into(),
        }
    }
}

/// Mask an email address for logging: `alice@example.com` -> `a***@example.com`.
///
/// Values without an `@` are masked entirely.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_serializes_camel_case() {
        let body = ErrorBody::new("DuplicateEmail", "taken");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["errorType"], "DuplicateEmail");
        assert_eq!(json["errorMessage"], "taken");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
