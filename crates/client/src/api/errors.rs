//! API client errors.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx status.
    #[error("{endpoint} failed with status {status}: {body}")]
    Status {
        /// Endpoint path
        endpoint: &'static str,

        /// HTTP status code
        status: u16,

        /// Response body, for diagnostics
        body: String,
    },

    /// The backend refused the login exchange.
    #[error("login failed: {0}")]
    Login(String),

    /// The response did not have the expected shape.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// Endpoint path
        endpoint: &'static str,

        /// What was wrong with it
        reason: String,
    },

    /// The client could not be configured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    pub(crate) fn malformed(endpoint: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint,
            reason: reason.into(),
        }
    }
}
