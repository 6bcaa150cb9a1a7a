//! Directory Query Client
//!
//! Looks up existing principals in a user pool by attribute. The dispatcher
//! only depends on [`DirectoryClient`], so tests substitute a fake and the
//! server wires in [`CognitoDirectoryClient`] (feature `cognito`).

use async_trait::async_trait;

use crate::TriggerError;

/// Exact-match filter over a single user attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    pub attribute: String,
    pub value: String,
}

impl AttributeFilter {
    pub fn equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Render as a `ListUsers` filter expression, e.g. `email = "a@b.c"`.
    pub fn expression(&self) -> String {
        let escaped = self.value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{} = \"{}\"", self.attribute, escaped)
    }
}

/// A bounded attribute query against one user pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub user_pool_id: String,
    pub filter: AttributeFilter,
    pub limit: i32,
}

impl UserQuery {
    pub fn email_equals(user_pool_id: impl Into<String>, email: impl Into<String>, limit: i32) -> Self {
        Self {
            user_pool_id: user_pool_id.into(),
            filter: AttributeFilter::equals("email", email),
            limit,
        }
    }
}

/// An existing principal returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub username: String,
    pub status: Option<String>,
    pub enabled: bool,
}

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Return the principals matching `query`, at most `query.limit` of them.
    async fn list_users(&self, query: &UserQuery) -> Result<Vec<PrincipalRecord>, TriggerError>;
}

#[cfg(feature = "cognito")]
pub use cognito::CognitoDirectoryClient;

#[cfg(feature = "cognito")]
mod cognito {
    use async_trait::async_trait;
    use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
    use aws_sdk_cognitoidentityprovider::Client;
    use tracing::{debug, info};

    use super::{DirectoryClient, PrincipalRecord, UserQuery};
    use crate::TriggerError;

    /// Cognito user pool backed directory client
    pub struct CognitoDirectoryClient {
        client: Client,
    }

    impl CognitoDirectoryClient {
        pub fn new(client: Client) -> Self {
            Self { client }
        }

        /// Build a client from the standard AWS SDK chain.
        ///
        /// # Arguments
        /// * `region` - Optional AWS region (uses default if not specified)
        /// * `endpoint_url` - Optional endpoint override for local emulators
        pub async fn from_env(region: Option<String>, endpoint_url: Option<String>) -> Self {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(aws_config::Region::new(region));
            }
            if let Some(endpoint_url) = endpoint_url {
                info!(endpoint = %endpoint_url, "Configuring user pool client with endpoint override");
                loader = loader.endpoint_url(endpoint_url);
            }
            let config = loader.load().await;
            Self::new(Client::new(&config))
        }
    }

    #[async_trait]
    impl DirectoryClient for CognitoDirectoryClient {
        async fn list_users(&self, query: &UserQuery) -> Result<Vec<PrincipalRecord>, TriggerError> {
            debug!(
                user_pool_id = %query.user_pool_id,
                attribute = %query.filter.attribute,
                limit = query.limit,
                "Listing users"
            );

            let output = self.client
                .list_users()
                .user_pool_id(&query.user_pool_id)
                .filter(query.filter.expression())
                .limit(query.limit)
                .send()
                .await
                .map_err(|e| TriggerError::Directory(DisplayErrorContext(&e).to_string()))?;

            Ok(output
                .users()
                .iter()
                .map(|user| PrincipalRecord {
                    username: user.username().unwrap_or_default().to_string(),
                    status: user.user_status().map(|s| s.as_str().to_string()),
                    enabled: user.enabled(),
                })
                .collect())
        }
    }
}
