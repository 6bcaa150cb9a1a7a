use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriggerError {
    /// The message is shown to the user by the hosted sign-up flow.
    #[error("The email address {email} has been registered. Please use another email address or log in directly.")]
    DuplicateEmail { email: String },

    #[error("Notification delivery failed: {0}")]
    NotificationDeliveryFailed(String),

    #[error("Directory query failed: {0}")]
    Directory(String),
}

impl TriggerError {
    /// Stable error type name reported to the invoking runtime.
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerError::DuplicateEmail { .. } => "DuplicateEmail",
            TriggerError::NotificationDeliveryFailed(_) => "NotificationDeliveryFailed",
            TriggerError::Directory(_) => "DirectoryQueryFailed",
        }
    }

    /// Whether the end user can fix this by changing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, TriggerError::DuplicateEmail { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_email_message_names_address() {
        let err = TriggerError::DuplicateEmail { email: "alice@example.com".to_string() };
        assert_eq!(
            err.to_string(),
            "The email address alice@example.com has been registered. Please use another email address or log in directly."
        );
        assert_eq!(err.kind(), "DuplicateEmail");
        assert!(err.is_user_correctable());
    }

    #[test]
    fn test_downstream_errors_are_not_user_correctable() {
        let err = TriggerError::NotificationDeliveryFailed("HTTP 503".to_string());
        assert_eq!(err.kind(), "NotificationDeliveryFailed");
        assert!(!err.is_user_correctable());
        assert!(!TriggerError::Directory("throttled".to_string()).is_user_correctable());
    }
}
