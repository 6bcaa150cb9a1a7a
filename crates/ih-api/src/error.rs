use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ih_authorizer::AuthorizerError;
use ih_common::ErrorBody;
use ih_trigger::TriggerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error(transparent)]
    Authorizer(#[from] AuthorizerError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Trigger(TriggerError::DuplicateEmail { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Trigger(TriggerError::NotificationDeliveryFailed(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Trigger(TriggerError::Directory(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Authorizer(AuthorizerError::Unauthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Authorizer(AuthorizerError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Trigger(e) => e.kind(),
            ApiError::Authorizer(e) => e.kind(),
            ApiError::InvalidBody(_) => "InvalidRequest",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(self.error_type(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(TriggerError::DuplicateEmail { email: "a@b.c".into() }), StatusCode::BAD_REQUEST),
            (ApiError::from(TriggerError::NotificationDeliveryFailed("x".into())), StatusCode::BAD_GATEWAY),
            (ApiError::from(TriggerError::Directory("x".into())), StatusCode::BAD_GATEWAY),
            (ApiError::from(AuthorizerError::Unauthorized), StatusCode::UNAUTHORIZED),
            (
                ApiError::from(AuthorizerError::Forbidden {
                    principal_id: "u".into(),
                    required_group: "admin".into(),
                }),
                StatusCode::FORBIDDEN,
            ),
            (ApiError::InvalidBody("eof".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{}", err);
        }
    }

    #[test]
    fn test_transparent_messages() {
        let err = ApiError::from(AuthorizerError::Unauthorized);
        assert_eq!(err.to_string(), "Unauthorized");
        assert_eq!(err.error_type(), "Unauthorized");
    }
}
