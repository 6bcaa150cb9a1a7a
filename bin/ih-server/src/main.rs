//! idhook Server
//!
//! Hosts the user pool lifecycle hooks and the token authorizer behind one
//! HTTP listener.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use ih_api::{create_router, AppState};
use ih_authorizer::TokenAuthorizer;
use ih_config::{AppConfig, ConfigLoader, NotificationConfig};
use ih_secrets::SecretResolver;
use ih_trigger::{
    CognitoDirectoryClient, ConfirmationNotifier, DisabledNotifier, HttpConfirmationNotifier,
    HttpNotifierConfig, LifecycleDispatcher,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ih_common::logging::init_logging("ih-server")?;

    info!("Starting idhook server");

    let config = ConfigLoader::new().load()?;
    config.validate()?;

    let dispatcher = build_dispatcher(&config).await?;
    let authorizer = TokenAuthorizer::new(config.authorizer.required_group.clone());
    info!(
        required_group = %authorizer.required_group(),
        forbidden_as_deny = config.authorizer.forbidden_as_deny,
        "Token authorizer configured"
    );

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        authorizer: Arc::new(authorizer),
        forbidden_as_deny: config.authorizer.forbidden_as_deny,
    };
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let host: std::net::IpAddr = config
        .http
        .host
        .parse()
        .with_context(|| format!("invalid http.host {}", config.http.host))?;
    let addr = SocketAddr::new(host, config.http.port);
    info!(?addr, "HTTP server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("idhook server stopped");
    Ok(())
}

async fn build_dispatcher(config: &AppConfig) -> anyhow::Result<LifecycleDispatcher> {
    let directory = CognitoDirectoryClient::from_env(
        non_empty(&config.directory.region),
        non_empty(&config.directory.endpoint_url),
    )
    .await;

    let notifier = build_notifier(config).await?;

    Ok(LifecycleDispatcher::new(Arc::new(directory), notifier)
        .with_page_size(config.directory.effective_page_size()))
}

async fn build_notifier(config: &AppConfig) -> anyhow::Result<Arc<dyn ConfirmationNotifier>> {
    let n: &NotificationConfig = &config.notification;
    if !n.is_enabled() {
        warn!("No notification endpoint configured, post confirmation events will fail");
        return Ok(Arc::new(DisabledNotifier));
    }

    let mut notifier_config = HttpNotifierConfig::new(n.confirm_url())
        .with_request_timeout(n.timeout());
    notifier_config.connect_timeout = n.connect_timeout();

    if !n.header_key.is_empty() {
        let secrets_config = ih_secrets::SecretsConfig {
            provider: config.secrets.provider.clone(),
            aws_region: non_empty(&config.secrets.aws_region),
            aws_prefix: non_empty(&config.secrets.aws_prefix),
        };
        if SecretResolver::is_reference(&n.header_value) {
            info!(provider = %config.secrets.provider, "Resolving notification header from secret reference");
        }
        let resolver = SecretResolver::new(&secrets_config).await?;
        let value = resolver
            .resolve(&n.header_value)
            .await
            .context("failed to resolve notification.header_value")?;
        notifier_config = notifier_config.with_header(n.header_key.clone(), value);
    }

    Ok(Arc::new(HttpConfirmationNotifier::new(notifier_config)?))
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
