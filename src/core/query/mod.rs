//! Query pagination
//!
//! Wraps the opaque query capability of the record store in a sequential,
//! bounded-memory page cursor.

pub mod paginator;

pub use paginator::{validate_page_size, PageCursor, PaginatorOptions};
