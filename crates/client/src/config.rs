//! Client configuration
//!
//! Everything the API client needs is passed in explicitly through
//! [`ApiConfig`]; nothing is read from ambient process state after startup.

use std::time::Duration;

use clap::Args;
use jiff::{
    Timestamp,
    civil::Date,
    tz::{Offset, TimeZone},
};
use thiserror::Error;

/// Default backend address.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured UTC offset is out of range.
    #[error("invalid UTC offset: {0} hours")]
    InvalidUtcOffset(i8, #[source] jiff::Error),
}

/// Backend API settings.
#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Backend base URL
    #[arg(long = "api-url", env = "REWARDPANG_API_URL", default_value = DEFAULT_API_URL)]
    pub base_url: String,

    /// UTC offset, in hours, that purchase timestamps and "today" are read in
    #[arg(
        long,
        env = "REWARDPANG_UTC_OFFSET",
        default_value_t = 9,
        allow_hyphen_values = true
    )]
    pub utc_offset_hours: i8,

    /// Request timeout in seconds
    #[arg(long, env = "REWARDPANG_TIMEOUT_SECONDS", default_value_t = 10)]
    pub timeout_seconds: u64,
}

impl ApiConfig {
    /// Create a configuration for the given base URL with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            utc_offset_hours: 9,
            timeout_seconds: 10,
        }
    }

    /// Full URL for an endpoint path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Fixed-offset time zone for calendar dates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUtcOffset`] if the offset is out of range.
    pub fn time_zone(&self) -> Result<TimeZone, ConfigError> {
        Offset::from_hours(self.utc_offset_hours)
            .map(TimeZone::fixed)
            .map_err(|error| ConfigError::InvalidUtcOffset(self.utc_offset_hours, error))
    }
}

/// Today's date in `time_zone`.
#[must_use]
pub fn today(time_zone: &TimeZone) -> Date {
    Timestamp::now().to_zoned(time_zone.clone()).date()
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
