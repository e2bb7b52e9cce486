//! Logging subscriber initialisation.

use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::{LogFormat, LoggingConfig};

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global tracing subscriber.
///
/// A valid `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    match config.log_format {
        LogFormat::Compact => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true),
        ),
        LogFormat::Json => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true),
        ),
    }
}

fn build_env_filter(config: &LoggingConfig, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            EnvFilter::new(format!(
                "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn",
                config.log_level
            ))
        })
}

fn init_with_layer<L>(config: &LoggingConfig, fmt_layer: L) -> Result<(), ObservabilityError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(config, rust_log.as_deref()))
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_level: &str) -> LoggingConfig {
        LoggingConfig {
            log_level: log_level.to_string(),
            log_format: LogFormat::Compact,
        }
    }

    #[test]
    fn configured_level_is_used_without_rust_log() {
        let filter = build_env_filter(&config("debug"), None).to_string();

        assert!(filter.contains("debug"), "filter was {filter}");
        assert!(filter.contains("hyper=warn"), "filter was {filter}");
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        let filter = build_env_filter(&config("debug"), Some("rewardpang=trace")).to_string();

        assert!(filter.contains("rewardpang=trace"), "filter was {filter}");
        assert!(!filter.contains("hyper=warn"), "filter was {filter}");
    }

    #[test]
    fn invalid_rust_log_falls_back_to_configured_level() {
        let filter = build_env_filter(&config("info"), Some("rewardpang=loud")).to_string();

        assert!(filter.contains("info"), "filter was {filter}");
        assert!(filter.contains("reqwest=warn"), "filter was {filter}");
    }
}
