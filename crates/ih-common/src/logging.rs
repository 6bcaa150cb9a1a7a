//! Structured Logging Configuration
//!
//! - `LOG_FORMAT=json` emits one flattened JSON object per event, with the
//!   enclosing spans (`lifecycle`, `authorize`) attached
//! - anything else emits human-readable text
//!
//! `RUST_LOG` filters as usual. Without it the default is `info`, with the
//! AWS SDK and HTTP client internals held at `warn`.
//!
//! ```rust,ignore
//! ih_common::logging::init_logging("ih-server")?;
//! tracing::info!(user_name = %name, "User confirmed");
//! ```

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer, Registry,
};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info,aws_config=warn,aws_smithy_runtime=warn,hyper=warn,reqwest=warn";

/// Output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// Anything other than "json" is text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    pub fn from_env() -> Self {
        Self::parse(&std::env::var("LOG_FORMAT").unwrap_or_default())
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn format_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_target(true)
            .with_ansi(std::env::var_os("NO_COLOR").is_none())
            .boxed(),
    }
}

/// Install the global subscriber for `service_name`.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(service_name: &str) -> Result<(), TryInitError> {
    let format = LogFormat::from_env();

    tracing_subscriber::registry()
        .with(format_layer(format))
        .with(env_filter())
        .try_init()?;

    tracing::info!(service = %service_name, ?format, "Logging initialized");
    Ok(())
}
