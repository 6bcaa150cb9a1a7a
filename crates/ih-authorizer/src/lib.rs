//! idhook Token Authorizer
//!
//! Turns a bearer token into an `execute-api:Invoke` policy for the method
//! being called. Callers must belong to the configured group (`admin` by
//! default).
//!
//! # Trust boundary
//!
//! Token signatures are NOT verified here. The authorizer sits behind a
//! gateway that has already validated the token against the user pool, and
//! only reads the claims it carries. Do not expose it to unverified input.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info_span, warn};

pub mod claims;
pub mod policy;

pub use claims::AuthorizationClaims;
pub use policy::{AuthorizerRequest, AuthorizerResponse, Effect, PolicyDocument, Statement};

pub const DEFAULT_REQUIRED_GROUP: &str = "admin";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizerError {
    /// Missing, malformed or undecodable token. Deliberately carries no detail.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {required_group} access required")]
    Forbidden {
        principal_id: String,
        required_group: String,
    },
}

impl AuthorizerError {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthorizerError::Unauthorized => "Unauthorized",
            AuthorizerError::Forbidden { .. } => "Forbidden",
        }
    }
}

pub struct TokenAuthorizer {
    required_group: String,
}

impl TokenAuthorizer {
    pub fn new(required_group: impl Into<String>) -> Self {
        Self {
            required_group: required_group.into(),
        }
    }

    pub fn required_group(&self) -> &str {
        &self.required_group
    }

    pub fn authorize(&self, request: &AuthorizerRequest) -> Result<AuthorizerResponse, AuthorizerError> {
        let _span = info_span!("authorize", method_arn = %request.method_arn).entered();

        let raw = request.authorization_token.as_deref().unwrap_or_default();
        let claims = AuthorizationClaims::from_bearer(raw).map_err(|e| {
            debug!("Token could not be decoded");
            e
        })?;

        if !claims.has_group(&self.required_group) {
            warn!(
                principal_id = %claims.sub,
                required_group = %self.required_group,
                "Caller lacks required group"
            );
            return Err(AuthorizerError::Forbidden {
                principal_id: claims.sub,
                required_group: self.required_group.clone(),
            });
        }

        debug!(principal_id = %claims.sub, "Access allowed");

        let context = BTreeMap::from([
            ("userId".to_string(), claims.sub.clone()),
            ("email".to_string(), claims.email_or_empty().to_string()),
            ("groups".to_string(), claims.joined_groups()),
        ]);

        Ok(AuthorizerResponse {
            policy_document: PolicyDocument::invoke(Effect::Allow, request.method_arn.clone()),
            principal_id: claims.sub,
            context,
        })
    }

    /// Explicit deny for a caller that decoded but lacks the group.
    pub fn deny(principal_id: impl Into<String>, method_arn: impl Into<String>) -> AuthorizerResponse {
        AuthorizerResponse {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument::invoke(Effect::Deny, method_arn),
            context: BTreeMap::new(),
        }
    }
}

impl Default for TokenAuthorizer {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_GROUP)
    }
}
