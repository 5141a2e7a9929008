//! Error types for Pandash.
//!
//! This module provides a unified error type for all Pandash operations,
//! with specific error variants for different failure modes.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for Pandash operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Pandash.
#[derive(Error, Debug)]
pub enum Error {
    /// The backend rejected the API key (HTTP 401)
    #[error("API key rejected by the server")]
    Unauthorized,

    /// The backend answered with a non-success HTTP status
    #[error("server returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Error text from the body, if any
        message: String,
    },

    /// The envelope reported `success: false`
    #[error("{0}")]
    Api(String),

    /// The backend could not be reached
    #[error("cannot connect to server: {0}")]
    Network(String),

    /// The response body did not match the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Local settings validation failed
    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),

    /// An account-scoped operation ran without a selected account
    #[error("select an account first")]
    NoAccount,

    /// An empty API key was submitted
    #[error("API key must not be empty")]
    EmptyApiKey,

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if this error means the stored API key is no longer valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Http { .. } | Self::Api(_))
    }

    /// Get a user-friendly suggestion for resolving this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Unauthorized => Some("Run 'pandash login <KEY>' with a valid API key"),
            Self::Network(_) => Some("Check that the server is running and server.base_url is correct"),
            Self::NoAccount => Some("Pass --account or select an account in the dashboard"),
            Self::Validation(_) => Some("Fix the listed fields and save again"),
            Self::ConfigError(_) => Some("Check the config file with 'pandash config path'"),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                Self::Unauthorized
            } else {
                Self::Http {
                    status: status.as_u16(),
                    message: e.to_string(),
                }
            }
        } else {
            Self::Network(e.to_string())
        }
    }
}
