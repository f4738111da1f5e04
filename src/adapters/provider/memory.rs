//! Static in-memory query provider
//!
//! Serves a fixed record set through both provider shapes. Used for small
//! hardcoded exports and throughout the test suite; it counts `execute` and
//! `run` calls so tests can assert that invalid jobs never reach the store.

use crate::domain::query::QuerySpec;
use crate::domain::record::{Page, RawRecord};
use crate::domain::{QueryError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::traits::{PageSource, QueryProvider};

/// Query provider backed by a fixed in-memory record set
///
/// Ignores the filter tree: the record set is assumed to already be the
/// query result. Pagination behaves exactly like a real store: disjoint
/// pages, stable order, page count known up front.
pub struct StaticProvider {
    records: Vec<RawRecord>,
    execute_calls: Arc<AtomicUsize>,
}

impl StaticProvider {
    /// Creates a provider serving the given records
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            execute_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times `execute` or `run` has been called
    pub fn query_count(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }

    /// Shared handle to the query counter, usable after the provider moved
    pub fn query_counter(&self) -> Arc<AtomicUsize> {
        self.execute_calls.clone()
    }
}

#[async_trait]
impl QueryProvider for StaticProvider {
    async fn execute(&self, spec: &QuerySpec, page_size: usize) -> Result<Box<dyn PageSource>> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            entity_type = %spec.entity_type,
            page_size,
            records = self.records.len(),
            "Opening static paged execution"
        );

        let pages: Vec<Page> = self
            .records
            .chunks(page_size)
            .enumerate()
            .map(|(index, chunk)| Page::new(index, chunk.to_vec()))
            .collect();

        Ok(Box::new(StaticPageSource {
            total_records: self.records.len(),
            pages,
        }))
    }

    async fn run(&self, spec: &QuerySpec) -> Result<Vec<RawRecord>> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            entity_type = %spec.entity_type,
            records = self.records.len(),
            "Running static sequential query"
        );
        Ok(self.records.clone())
    }
}

/// Paged view over a static record set
#[derive(Debug)]
struct StaticPageSource {
    total_records: usize,
    pages: Vec<Page>,
}

#[async_trait]
impl PageSource for StaticPageSource {
    fn total_pages(&self) -> usize {
        self.pages.len()
    }

    fn total_records(&self) -> usize {
        self.total_records
    }

    async fn fetch(&mut self, index: usize) -> Result<Page> {
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| {
                QueryError::PageFetchFailed {
                    position: index,
                    message: format!("page index out of range (total {})", self.pages.len()),
                }
                .into()
            })
    }
}
