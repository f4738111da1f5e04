//! Core business logic
//!
//! The export pipeline: query pagination, field resolution and formatting,
//! row serialization and job orchestration.

pub mod export;
pub mod format;
pub mod query;
pub mod serialize;
