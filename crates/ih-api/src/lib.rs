//! idhook HTTP API
//!
//! Endpoints:
//! - `POST /lifecycle` user pool trigger events
//! - `POST /authorize` token authorizer requests
//! - `GET /health`, `/health/live`, `/health/ready` checks

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ih_authorizer::{AuthorizerError, AuthorizerRequest, TokenAuthorizer};
use ih_trigger::{InvocationContext, LifecycleDispatcher, LifecycleEvent};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

mod error;

pub use error::ApiError;

/// Headers the function runtime uses to carry its request id.
pub const REQUEST_ID_HEADERS: [&str; 2] = ["x-amzn-requestid", "lambda-runtime-aws-request-id"];

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<LifecycleDispatcher>,
    pub authorizer: Arc<TokenAuthorizer>,
    /// Answer Forbidden with a Deny policy instead of a 403
    pub forbidden_as_deny: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub notifications: String,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub status: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/lifecycle", post(lifecycle_handler))
        .route("/authorize", post(authorize_handler))
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check))
        .with_state(state)
}

/// Runtime-supplied request id, or a fresh one.
pub fn request_id(headers: &HeaderMap) -> String {
    REQUEST_ID_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

async fn lifecycle_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LifecycleEvent>, ApiError> {
    let ctx = InvocationContext::new(request_id(&headers));
    debug!(request_id = %ctx.request_id, event = %String::from_utf8_lossy(&body), "Lifecycle event received");

    let event: LifecycleEvent = serde_json::from_slice(&body).map_err(|e| {
        warn!(request_id = %ctx.request_id, error = %e, "Rejected malformed lifecycle event");
        ApiError::InvalidBody(e.to_string())
    })?;

    match state.dispatcher.dispatch(event, &ctx).await {
        Ok(event) => Ok(Json(event)),
        Err(e) => {
            if e.is_user_correctable() {
                info!(request_id = %ctx.request_id, kind = e.kind(), "Lifecycle event rejected");
            } else {
                warn!(request_id = %ctx.request_id, kind = e.kind(), error = %e, "Lifecycle event failed");
            }
            Err(e.into())
        }
    }
}

async fn authorize_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = request_id(&headers);

    let request: AuthorizerRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Rejected malformed authorizer request");
        ApiError::InvalidBody(e.to_string())
    })?;

    match state.authorizer.authorize(&request) {
        Ok(response) => {
            info!(request_id = %request_id, principal_id = %response.principal_id, "Access allowed");
            Ok(Json(response).into_response())
        }
        Err(AuthorizerError::Forbidden { principal_id, .. }) if state.forbidden_as_deny => {
            info!(request_id = %request_id, principal_id = %principal_id, "Access denied by policy");
            Ok(Json(TokenAuthorizer::deny(principal_id, request.method_arn)).into_response())
        }
        Err(e) => {
            info!(request_id = %request_id, kind = e.kind(), "Access refused");
            Err(e.into())
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let notifications = if state.dispatcher.notifications_enabled() {
        "ENABLED"
    } else {
        "DISABLED"
    };

    Json(HealthResponse {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        notifications: notifications.to_string(),
    })
}

async fn liveness_check() -> Json<CheckResponse> {
    Json(CheckResponse { status: "LIVE".to_string() })
}

/// Handlers hold no warm-up state, so a running server is ready.
async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(CheckResponse { status: "READY".to_string() }))
}
