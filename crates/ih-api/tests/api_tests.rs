//! API Endpoint Tests
//!
//! Tests for:
//! - Health endpoints (basic, liveness, readiness)
//! - Lifecycle event handling and error bodies
//! - Token authorization, including Deny rendering

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use ih_api::{create_router, AppState};
use ih_authorizer::TokenAuthorizer;
use ih_trigger::{
    ConfirmationNotifier, ConfirmationPayload, DirectoryClient, DisabledNotifier,
    LifecycleDispatcher, PrincipalRecord, TriggerError, UserQuery,
};

const ARN: &str = "arn:aws:execute-api:us-east-1:123456789012:abc123/prod/GET/users";

/// Mock directory with one registered address
struct MockDirectory;

#[async_trait]
impl DirectoryClient for MockDirectory {
    async fn list_users(&self, query: &UserQuery) -> Result<Vec<PrincipalRecord>, TriggerError> {
        if query.filter.value == "taken@example.com" {
            Ok(vec![PrincipalRecord {
                username: "existing".to_string(),
                status: Some("CONFIRMED".to_string()),
                enabled: true,
            }])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Mock notifier recording payloads
struct MockNotifier {
    payloads: parking_lot::Mutex<Vec<ConfirmationPayload>>,
}

impl MockNotifier {
    fn new() -> Self {
        Self {
            payloads: parking_lot::Mutex::new(Vec::new()),
        }
    }

    fn sent_count(&self) -> usize {
        self.payloads.lock().len()
    }
}

#[async_trait]
impl ConfirmationNotifier for MockNotifier {
    async fn notify(&self, payload: &ConfirmationPayload) -> Result<(), TriggerError> {
        self.payloads.lock().push(payload.clone());
        Ok(())
    }
}

fn create_test_app(forbidden_as_deny: bool) -> (axum::Router, Arc<MockNotifier>) {
    let notifier = Arc::new(MockNotifier::new());
    let state = AppState {
        dispatcher: Arc::new(LifecycleDispatcher::new(Arc::new(MockDirectory), notifier.clone())),
        authorizer: Arc::new(TokenAuthorizer::default()),
        forbidden_as_deny,
    };
    (create_router(state), notifier)
}

async fn send(app: axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-amzn-requestid", "test-request")
        .body(body)
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn lifecycle_event(trigger_source: &str, email: &str) -> Value {
    json!({
        "version": "1",
        "region": "us-east-1",
        "userPoolId": "us-east-1_TestPool",
        "userName": "alice",
        "callerContext": { "awsSdkVersion": "aws-sdk-unknown-unknown", "clientId": "c1" },
        "triggerSource": trigger_source,
        "request": { "userAttributes": { "email": email } },
        "response": { "autoConfirmUser": false, "autoVerifyPhone": false, "autoVerifyEmail": false }
    })
}

fn bearer(claims: Value) -> String {
    format!("Bearer eyJhbGciOiJSUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

// ============================================================================
// Health Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app(false);
    let (status, body) = send(app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["notifications"], "ENABLED");
}

#[tokio::test]
async fn test_health_reports_disabled_notifications() {
    let state = AppState {
        dispatcher: Arc::new(LifecycleDispatcher::new(Arc::new(MockDirectory), Arc::new(DisabledNotifier))),
        authorizer: Arc::new(TokenAuthorizer::default()),
        forbidden_as_deny: false,
    };
    let (status, body) = send(create_router(state), Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notifications"], "DISABLED");
}

#[tokio::test]
async fn test_liveness_and_readiness() {
    let (app, _) = create_test_app(false);
    let (status, body) = send(app.clone(), Method::GET, "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "LIVE");

    let (status, body) = send(app, Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "READY");
}

// ============================================================================
// Lifecycle Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_sign_up_echoes_event_with_flags() {
    let (app, _) = create_test_app(false);
    let input = lifecycle_event("PreSignUp_ExternalProvider", "new@example.com");
    let (status, body) = send(app, Method::POST, "/lifecycle", Some(input.clone())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["autoConfirmUser"], true);
    assert_eq!(body["response"]["autoVerifyEmail"], true);
    assert_eq!(body["response"]["autoVerifyPhone"], false);
    assert_eq!(body["callerContext"], input["callerContext"]);
    assert_eq!(body["version"], "1");
}

#[tokio::test]
async fn test_duplicate_email_error_body() {
    let (app, _) = create_test_app(false);
    let (status, body) = send(
        app,
        Method::POST,
        "/lifecycle",
        Some(lifecycle_event("PreSignUp_SignUp", "taken@example.com")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "DuplicateEmail");
    assert_eq!(
        body["errorMessage"],
        "The email address taken@example.com has been registered. Please use another email address or log in directly."
    );
}

#[tokio::test]
async fn test_post_confirmation_notifies() {
    let (app, notifier) = create_test_app(false);
    let input = lifecycle_event("PostConfirmation_ConfirmSignUp", "alice@example.com");
    let (status, body) = send(app, Method::POST, "/lifecycle", Some(input.clone())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, input);
    assert_eq!(notifier.sent_count(), 1);
}

#[tokio::test]
async fn test_post_confirmation_without_endpoint_is_bad_gateway() {
    let state = AppState {
        dispatcher: Arc::new(LifecycleDispatcher::new(Arc::new(MockDirectory), Arc::new(DisabledNotifier))),
        authorizer: Arc::new(TokenAuthorizer::default()),
        forbidden_as_deny: false,
    };
    let (status, body) = send(
        create_router(state),
        Method::POST,
        "/lifecycle",
        Some(lifecycle_event("PostConfirmation_ConfirmSignUp", "alice@example.com")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["errorType"], "NotificationDeliveryFailed");
}

#[tokio::test]
async fn test_malformed_event_is_bad_request() {
    let (app, _) = create_test_app(false);
    let (status, body) = send(app, Method::POST, "/lifecycle", Some(json!({"userName": "x"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "InvalidRequest");
}

// ============================================================================
// Authorizer Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_admin_gets_allow_policy() {
    let (app, _) = create_test_app(false);
    let request = json!({
        "type": "TOKEN",
        "authorizationToken": bearer(json!({
            "sub": "user-1",
            "email": "alice@example.com",
            "cognito:groups": ["admin", "ops"]
        })),
        "methodArn": ARN
    });
    let (status, body) = send(app, Method::POST, "/authorize", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "principalId": "user-1",
            "policyDocument": {
                "Version": "2012-10-17",
                "Statement": [{ "Action": "execute-api:Invoke", "Effect": "Allow", "Resource": ARN }]
            },
            "context": { "userId": "user-1", "email": "alice@example.com", "groups": "admin,ops" }
        })
    );
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let (app, _) = create_test_app(false);
    let request = json!({
        "authorizationToken": bearer(json!({"sub": "user-2", "cognito:groups": ["ops"]})),
        "methodArn": ARN
    });
    let (status, body) = send(app, Method::POST, "/authorize", Some(request)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errorType"], "Forbidden");
}

#[tokio::test]
async fn test_non_admin_gets_deny_policy_when_configured() {
    let (app, _) = create_test_app(true);
    let request = json!({
        "authorizationToken": bearer(json!({"sub": "user-2", "cognito:groups": ["ops"]})),
        "methodArn": ARN
    });
    let (status, body) = send(app, Method::POST, "/authorize", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["principalId"], "user-2");
    assert_eq!(body["policyDocument"]["Statement"][0]["Effect"], "Deny");
    assert_eq!(body["policyDocument"]["Statement"][0]["Resource"], ARN);
}

#[tokio::test]
async fn test_missing_and_malformed_tokens_match() {
    let (app, _) = create_test_app(true);
    let missing = send(app.clone(), Method::POST, "/authorize", Some(json!({"methodArn": ARN}))).await;
    let malformed = send(
        app,
        Method::POST,
        "/authorize",
        Some(json!({"authorizationToken": "Bearer garbage", "methodArn": ARN})),
    )
    .await;

    assert_eq!(missing.0, StatusCode::UNAUTHORIZED);
    assert_eq!(missing, malformed);
    assert_eq!(missing.1["errorMessage"], "Unauthorized");
}
