//! Result type alias for Tabula operations

use super::errors::TabulaError;

/// Result type alias using [`TabulaError`]
pub type Result<T> = std::result::Result<T, TabulaError>;
