//! Query provider abstraction
//!
//! This module defines the traits the engine consumes to execute queries
//! against a hosted record store. A provider offers two shapes: a paged
//! execution ([`PageSource`]) that exposes the page count up front and
//! fetches one page at a time, and a simpler sequential `run` for small
//! fixed result sets. The query paginator normalizes both.

use crate::domain::query::QuerySpec;
use crate::domain::record::{Page, RawRecord};
use crate::domain::Result;
use async_trait::async_trait;

/// A paged query execution
///
/// The total number of pages is known when the execution opens; pages are
/// fetched individually by index. Implementations hold whatever cursor or
/// handle the backing store needs; they must not buffer more than the page
/// being fetched.
#[async_trait]
pub trait PageSource: Send + std::fmt::Debug {
    /// Total number of pages in this execution
    fn total_pages(&self) -> usize;

    /// Total number of records across all pages
    fn total_records(&self) -> usize;

    /// Fetches the page at `index`
    ///
    /// # Errors
    ///
    /// Returns a query error if the page cannot be retrieved; the caller
    /// attributes it to the failing position.
    async fn fetch(&mut self, index: usize) -> Result<Page>;
}

/// Query execution capability of a hosted record store
#[async_trait]
pub trait QueryProvider: Send + Sync {
    /// Opens a paged execution of `spec` with the given page size
    ///
    /// # Errors
    ///
    /// Returns a query error if the store rejects the query or cannot be
    /// reached.
    async fn execute(&self, spec: &QuerySpec, page_size: usize) -> Result<Box<dyn PageSource>>;

    /// Runs `spec` without paging, returning all records in result order
    ///
    /// Intended for small fixed result sets; large exports should use
    /// [`QueryProvider::execute`].
    ///
    /// # Errors
    ///
    /// Returns a query error if the store rejects the query or cannot be
    /// reached.
    async fn run(&self, spec: &QuerySpec) -> Result<Vec<RawRecord>>;
}
