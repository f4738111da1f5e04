//! Domain error types
//!
//! This module defines the error hierarchy for Tabula. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Tabula error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum TabulaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bad or missing caller input: entity type, columns, filters, dates,
    /// page sizes. Reported to the caller as a readable message, never as a
    /// raw fault escaping the transport boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Query provider errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Serialization errors (workbook construction, payload rendering)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cursor or job misuse; a programming error, not a runtime condition
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Output sink errors
    #[error("Sink error: {0}")]
    Sink(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl TabulaError {
    /// True for errors caused by caller input rather than runtime failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TabulaError::Validation(_) | TabulaError::Configuration(_)
        )
    }
}

/// Query-provider-specific errors
///
/// Errors that occur when executing queries against the hosted record store.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Failed to connect to the record store
    #[error("Failed to connect to record store: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The store rejected the query itself
    #[error("Query execution failed: {0}")]
    ExecutionFailed(String),

    /// A page fetch failed mid-traversal; carries the failing page position
    #[error("Failed to fetch page {position}: {message}")]
    PageFetchFailed { position: usize, message: String },

    /// Invalid response from the store
    #[error("Invalid response from record store: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl QueryError {
    /// The failing page position, when the error occurred mid-traversal
    pub fn page_position(&self) -> Option<usize> {
        match self {
            QueryError::PageFetchFailed { position, .. } => Some(*position),
            _ => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for TabulaError {
    fn from(err: std::io::Error) -> Self {
        TabulaError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TabulaError {
    fn from(err: serde_json::Error) -> Self {
        TabulaError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TabulaError {
    fn from(err: toml::de::Error) -> Self {
        TabulaError::Configuration(format!("TOML parse error: {err}"))
    }
}
