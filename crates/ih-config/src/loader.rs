//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "idhook.toml",
    "./config/config.toml",
    "/etc/idhook/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) but reads variables through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_env_overrides(&mut config, &lookup);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Some(path) = lookup("IDHOOK_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefixed variable first, then the legacy unprefixed name.
fn lookup_either<F>(lookup: &F, primary: &str, legacy: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(primary).or_else(|| lookup(legacy))
}

fn apply_env_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(port) = lookup("IDHOOK_HTTP_PORT").and_then(|v| v.parse().ok()) {
        config.http.port = port;
    }
    if let Some(val) = lookup("IDHOOK_HTTP_HOST") {
        config.http.host = val;
    }

    // Directory
    if let Some(val) = lookup_either(lookup, "IDHOOK_DIRECTORY_REGION", "AWS_REGION") {
        config.directory.region = val;
    }
    if let Some(val) = lookup("IDHOOK_DIRECTORY_ENDPOINT_URL") {
        config.directory.endpoint_url = val;
    }
    if let Some(size) = lookup("IDHOOK_DIRECTORY_PAGE_SIZE").and_then(|v| v.parse().ok()) {
        config.directory.page_size = size;
    }

    // Notification
    if let Some(val) = lookup_either(lookup, "IDHOOK_NOTIFICATION_BASE_URL", "apiGatewayUrl") {
        config.notification.base_url = val;
    }
    if let Some(val) = lookup("IDHOOK_NOTIFICATION_CONFIRM_PATH") {
        config.notification.confirm_path = val;
    }
    if let Some(val) = lookup_either(lookup, "IDHOOK_NOTIFICATION_HEADER_KEY", "COGNITO_CONFIRM_HEADER_KEY") {
        config.notification.header_key = val;
    }
    if let Some(val) = lookup_either(lookup, "IDHOOK_NOTIFICATION_HEADER_VALUE", "COGNITO_CONFIRM_HEADER_VALUE") {
        config.notification.header_value = val;
    }
    if let Some(secs) = lookup("IDHOOK_NOTIFICATION_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.notification.timeout_secs = secs;
    }

    // Authorizer
    if let Some(val) = lookup("IDHOOK_AUTHORIZER_REQUIRED_GROUP") {
        config.authorizer.required_group = val;
    }
    if let Some(val) = lookup("IDHOOK_AUTHORIZER_FORBIDDEN_AS_DENY") {
        config.authorizer.forbidden_as_deny = val.parse().unwrap_or(false);
    }

    // Secrets
    if let Some(val) = lookup("IDHOOK_SECRETS_PROVIDER") {
        config.secrets.provider = val;
    }
    if let Some(val) = lookup("IDHOOK_SECRETS_AWS_REGION") {
        config.secrets.aws_region = val;
    }
    if let Some(val) = lookup("IDHOOK_SECRETS_AWS_PREFIX") {
        config.secrets.aws_prefix = val;
    }
}
