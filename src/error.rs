//! Error types for the chat widget.
//!
//! The `Display` output of [`Error::Api`], [`Error::Http`] and [`Error::Json`]
//! is exactly the description shown to the user after the `Error: ` prefix,
//! so those variants carry no extra wording of their own.

use thiserror::Error;

/// Chat widget error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-supplied `error` field, or the generic fallback.
        message: String,
    },

    /// Transport failure (connection refused, DNS, TLS, ...).
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this failure came back from the endpoint as an HTTP status.
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, Error>;
