use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    /// Single-statement invoke policy for one method ARN.
    pub fn invoke(effect: Effect, resource: impl Into<String>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                action: INVOKE_ACTION.to_string(),
                effect,
                resource: resource.into(),
            }],
        }
    }
}

/// Request as sent by the gateway for a token authorizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub request_type: Option<String>,

    #[serde(default)]
    pub authorization_token: Option<String>,

    pub method_arn: String,
}

/// Authorization decision returned to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl AuthorizerResponse {
    pub fn effect(&self) -> Option<Effect> {
        self.policy_document.statement.first().map(|s| s.effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_wire_format() {
        let response = AuthorizerResponse {
            principal_id: "user-1".to_string(),
            policy_document: PolicyDocument::invoke(Effect::Allow, "arn:aws:execute-api:us-east-1:1:api/prod/GET/items"),
            context: BTreeMap::from([("userId".to_string(), "user-1".to_string())]),
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "principalId": "user-1",
                "policyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": "execute-api:Invoke",
                        "Effect": "Allow",
                        "Resource": "arn:aws:execute-api:us-east-1:1:api/prod/GET/items"
                    }]
                },
                "context": { "userId": "user-1" }
            })
        );
        assert_eq!(response.effect(), Some(Effect::Allow));
    }

    #[test]
    fn test_request_parsing() {
        let request: AuthorizerRequest = serde_json::from_value(json!({
            "type": "TOKEN",
            "authorizationToken": "Bearer abc",
            "methodArn": "arn:aws:execute-api:us-east-1:1:api/prod/GET/"
        }))
        .unwrap();
        assert_eq!(request.request_type.as_deref(), Some("TOKEN"));
        assert_eq!(request.authorization_token.as_deref(), Some("Bearer abc"));

        let no_token: AuthorizerRequest =
            serde_json::from_value(json!({ "methodArn": "arn" })).unwrap();
        assert!(no_token.authorization_token.is_none());
    }
}
