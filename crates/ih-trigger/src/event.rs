//! User pool trigger event model.
//!
//! The runtime expects the event it sent to come back with only `response`
//! changed, so every field we do not model is kept in a flattened map and
//! written back untouched.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The trigger kinds the dispatcher acts on.
///
/// Anything else is kept as [`TriggerSource::Other`] with its wire value so
/// it serializes back exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerSource {
    PreSignUpSignUp,
    PreSignUpAdminCreateUser,
    PreSignUpExternalProvider,
    PostConfirmationConfirmSignUp,
    PostAuthentication,
    Other(String),
}

impl TriggerSource {
    pub fn as_str(&self) -> &str {
        match self {
            TriggerSource::PreSignUpSignUp => "PreSignUp_SignUp",
            TriggerSource::PreSignUpAdminCreateUser => "PreSignUp_AdminCreateUser",
            TriggerSource::PreSignUpExternalProvider => "PreSignUp_ExternalProvider",
            TriggerSource::PostConfirmationConfirmSignUp => "PostConfirmation_ConfirmSignUp",
            TriggerSource::PostAuthentication => "PostAuthentication_Authentication",
            TriggerSource::Other(s) => s,
        }
    }

    pub fn is_pre_sign_up(&self) -> bool {
        matches!(
            self,
            TriggerSource::PreSignUpSignUp
                | TriggerSource::PreSignUpAdminCreateUser
                | TriggerSource::PreSignUpExternalProvider
        )
    }
}

impl From<String> for TriggerSource {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PreSignUp_SignUp" => TriggerSource::PreSignUpSignUp,
            "PreSignUp_AdminCreateUser" => TriggerSource::PreSignUpAdminCreateUser,
            "PreSignUp_ExternalProvider" => TriggerSource::PreSignUpExternalProvider,
            "PostConfirmation_ConfirmSignUp" => TriggerSource::PostConfirmationConfirmSignUp,
            "PostAuthentication_Authentication" => TriggerSource::PostAuthentication,
            _ => TriggerSource::Other(s),
        }
    }
}

impl From<&str> for TriggerSource {
    fn from(s: &str) -> Self {
        TriggerSource::from(s.to_string())
    }
}

impl From<TriggerSource> for String {
    fn from(source: TriggerSource) -> Self {
        match source {
            TriggerSource::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `request` section of a trigger event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_attributes: HashMap<String, String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single user pool trigger invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub trigger_source: TriggerSource,
    pub user_pool_id: String,
    pub user_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub request: EventRequest,

    /// The only part of the event the dispatcher writes to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub response: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LifecycleEvent {
    pub const EMAIL_ATTRIBUTE: &'static str = "email";

    /// The `email` user attribute, treating an empty value as absent.
    pub fn email(&self) -> Option<&str> {
        self.request
            .user_attributes
            .get(Self::EMAIL_ATTRIBUTE)
            .map(String::as_str)
            .filter(|email| !email.is_empty())
    }

    /// Write the pre sign-up confirmation flags into the response.
    pub fn set_pre_sign_up_flags(&mut self, auto_confirm_user: bool, auto_verify_email: bool) {
        self.response
            .insert("autoConfirmUser".to_string(), Value::Bool(auto_confirm_user));
        self.response
            .insert("autoVerifyEmail".to_string(), Value::Bool(auto_verify_email));
    }
}

/// Per-invocation metadata supplied by the runtime rather than the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
