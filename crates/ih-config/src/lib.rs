//! idhook Configuration System
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub directory: DirectoryConfig,
    pub notification: NotificationConfig,
    pub authorizer: AuthorizerConfig,
    pub secrets: SecretsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Identity directory (user pool) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// AWS region of the user pool (SDK default chain when empty)
    pub region: String,
    /// Endpoint override for local emulators
    pub endpoint_url: String,
    /// Result page bound for the email uniqueness query
    pub page_size: i32,
}

impl DirectoryConfig {
    /// Largest page the directory's list operation accepts.
    pub const MAX_PAGE_SIZE: i32 = 60;

    /// Page size clamped to what the directory accepts.
    pub fn effective_page_size(&self) -> i32 {
        self.page_size.clamp(1, Self::MAX_PAGE_SIZE)
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            endpoint_url: String::new(),
            page_size: 10,
        }
    }
}

/// Confirmation callback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Base URL of the downstream API (empty disables delivery)
    pub base_url: String,
    /// Path appended to the base URL for sign-up confirmations
    pub confirm_path: String,
    /// Name of the pre-shared header
    pub header_key: String,
    /// Value of the pre-shared header, a literal or a secret reference
    pub header_value: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl NotificationConfig {
    pub fn is_enabled(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    /// Full confirmation endpoint URL.
    pub fn confirm_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.confirm_path
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            confirm_path: "/public/user/confirmEmail".to_string(),
            header_key: String::new(),
            header_value: String::new(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// Token authorizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizerConfig {
    /// Group a caller must belong to
    pub required_group: String,
    /// Render Forbidden as an explicit Deny policy instead of a 403
    pub forbidden_as_deny: bool,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            required_group: "admin".to_string(),
            forbidden_as_deny: false,
        }
    }
}

/// Secrets provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Provider type: env, aws-sm
    pub provider: String,
    pub aws_region: String,
    pub aws_prefix: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            provider: "env".to_string(),
            aws_region: String::new(),
            aws_prefix: String::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject configurations the handlers cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = &self.notification;

        if n.header_key.is_empty() != n.header_value.is_empty() {
            return Err(ConfigError::ValidationError(
                "notification.header_key and notification.header_value must be set together".to_string(),
            ));
        }
        if n.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "notification.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if n.is_enabled() {
            reqwest::Url::parse(&n.confirm_url()).map_err(|e| {
                ConfigError::ValidationError(format!("notification.base_url is not a valid URL: {}", e))
            })?;
        }
        if self.authorizer.required_group.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "authorizer.required_group cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# idhook Configuration
# Environment variables override these settings

[http]
port = 8080
host = "0.0.0.0"

[directory]
region = ""        # SDK default chain when empty
endpoint_url = ""  # local emulator override
page_size = 10

[notification]
base_url = ""      # empty disables confirmation delivery
confirm_path = "/public/user/confirmEmail"
header_key = ""
header_value = ""  # literal, env://NAME or aws-sm://secret-name
timeout_secs = 10
connect_timeout_secs = 5

[authorizer]
required_group = "admin"
forbidden_as_deny = false

[secrets]
provider = "env"   # env, aws-sm
aws_region = ""
aws_prefix = ""
"#
        .to_string()
    }
}
