//! Custom error types for tv-browser.
//!
//! [`CatalogError`] is the tagged failure taxonomy produced by catalog
//! sources; [`AppError`] covers everything else the binary can fail with.

use std::io;
use thiserror::Error;

/// Failures of a catalog fetch.
///
/// Consumers match on the variant; nothing downstream inspects the message
/// text to classify an error.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure (connection refused, DNS, timeout, unreadable file)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Well-formed payload that is empty or not a collection
    #[error("Empty result: no records in payload")]
    EmptyResult,

    /// Payload that could not be decoded into catalog records
    #[error("Parse error: {0}")]
    Decode(String),

    /// The request was superseded before it completed
    #[error("Request cancelled")]
    Cancelled,
}

impl CatalogError {
    /// Whether this error only records that the request was superseded.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if !status.is_success() => CatalogError::Http {
                status: status.as_u16(),
            },
            _ if err.is_decode() => CatalogError::Decode(err.to_string()),
            _ => CatalogError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// File or terminal I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Catalog setup errors
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Browser not found or failed to start
    #[error("Browser error: {0}")]
    Browser(String),
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
