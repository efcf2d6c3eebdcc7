//! Unified error types for the user API service and polling client.

use thiserror::Error;

/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Polling client error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Record store errors.
///
/// The display strings are the exact messages returned to HTTP callers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Create was called without a name or email.
    #[error("Name and email are required")]
    InvalidInput,

    /// No record matches the given identifier.
    #[error("User not found")]
    NotFound,

    /// The request body was not valid JSON for the expected fields.
    #[error("Malformed JSON body")]
    MalformedBody,
}

impl StoreError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            StoreError::InvalidInput => "invalid_input",
            StoreError::NotFound => "not_found",
            StoreError::MalformedBody => "malformed_body",
        }
    }
}

/// Errors observed by the polling client when calling the store.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or connection failure (includes timeouts).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-2xx status.
    #[error("HTTP {status}: {reason}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase or error body.
        reason: String,
    },

    /// The configured base URL could not be joined with a request path.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
