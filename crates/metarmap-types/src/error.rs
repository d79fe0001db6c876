//! Error types for metarmap.

use thiserror::Error;

/// Result type alias for metarmap operations.
pub type Result<T> = std::result::Result<T, MetarMapError>;

/// Errors that can surface from a top-level fetch.
///
/// Per-chunk network and HTTP failures are absorbed by the fetch engine
/// and degrade to missing data; these variants are reserved for failures
/// the caller genuinely needs to see.
#[derive(Error, Debug)]
pub enum MetarMapError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// A response body was not valid UTF-8 text.
    #[error("decode error: {0}")]
    Decode(String),

    /// A response fragment could not be parsed as XML.
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration values could not be assembled into a request.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
