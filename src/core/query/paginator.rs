//! Cursor-based query pagination
//!
//! [`PageCursor`] drives sequential retrieval of a query's result set in
//! bounded pages. At most one page is in memory at a time, so total memory is
//! O(page size) regardless of how many records the query matches. Both
//! provider shapes, a paged execution and a plain sequential record list,
//! are normalized here so the job driver sees a single cursor type.

use crate::adapters::provider::{PageSource, QueryProvider};
use crate::domain::query::QuerySpec;
use crate::domain::record::{Page, RawRecord};
use crate::domain::{QueryError, Result, TabulaError};

/// Named pagination limits
///
/// The page-size ceiling mirrors what the hosted store enforces; jobs asking
/// for more are rejected before any query executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatorOptions {
    /// Largest page size a job may request
    pub max_page_size: usize,
}

impl Default for PaginatorOptions {
    fn default() -> Self {
        Self {
            max_page_size: 1000,
        }
    }
}

/// Validates a requested page size against the configured ceiling
///
/// # Errors
///
/// Returns a validation error for zero or over-ceiling page sizes.
pub fn validate_page_size(page_size: usize, options: &PaginatorOptions) -> Result<()> {
    if page_size == 0 {
        return Err(TabulaError::Validation(
            "page size must be a positive integer".to_string(),
        ));
    }
    if page_size > options.max_page_size {
        return Err(TabulaError::Validation(format!(
            "page size {} exceeds the maximum of {}",
            page_size, options.max_page_size
        )));
    }
    Ok(())
}

#[derive(Debug)]
enum CursorSource {
    /// A paged execution held against the provider
    Paged(Box<dyn PageSource>),
    /// A sequential result chunked locally into pages
    Sequential { records: Vec<RawRecord>, page_size: usize },
}

/// Stateful cursor over the pages of one query execution
///
/// Strictly sequential: each [`PageCursor::next`] advances the position by
/// one page. `Ok(None)` signals the end exactly once; any call after that is
/// a programming error and returns an illegal-state error rather than
/// silently re-reporting the end.
#[derive(Debug)]
pub struct PageCursor {
    source: CursorSource,
    total_pages: usize,
    total_records: usize,
    next_index: usize,
    finished: bool,
}

impl PageCursor {
    /// Opens a paged execution of `spec` through `provider`
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad page size, or a query error if
    /// the provider rejects the execution.
    pub async fn open(
        provider: &dyn QueryProvider,
        spec: &QuerySpec,
        page_size: usize,
        options: &PaginatorOptions,
    ) -> Result<Self> {
        validate_page_size(page_size, options)?;

        let source = provider.execute(spec, page_size).await?;
        let total_pages = source.total_pages();
        let total_records = source.total_records();

        tracing::debug!(
            entity_type = %spec.entity_type,
            page_size,
            total_pages,
            total_records,
            "Opened page cursor"
        );

        Ok(Self {
            source: CursorSource::Paged(source),
            total_pages,
            total_records,
            next_index: 0,
            finished: false,
        })
    }

    /// Wraps an already-materialized sequential result in cursor form
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad page size.
    pub fn from_records(
        records: Vec<RawRecord>,
        page_size: usize,
        options: &PaginatorOptions,
    ) -> Result<Self> {
        validate_page_size(page_size, options)?;

        let total_records = records.len();
        let total_pages = total_records.div_ceil(page_size);

        Ok(Self {
            source: CursorSource::Sequential { records, page_size },
            total_pages,
            total_records,
            next_index: 0,
            finished: false,
        })
    }

    /// Total number of pages in this execution
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Total number of records in this execution
    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Position of the next page to fetch
    pub fn position(&self) -> usize {
        self.next_index
    }

    /// Fetches the next page, or `Ok(None)` once at the end
    ///
    /// # Errors
    ///
    /// Returns an illegal-state error when called again after the end, or a
    /// query error naming the failing page position if the provider fails
    /// mid-traversal. Failed pages are not skipped and not retried here.
    pub async fn next(&mut self) -> Result<Option<Page>> {
        if self.finished {
            return Err(TabulaError::IllegalState(
                "page cursor already exhausted".to_string(),
            ));
        }

        if self.next_index >= self.total_pages {
            self.finished = true;
            return Ok(None);
        }

        let index = self.next_index;
        let page = match &mut self.source {
            CursorSource::Paged(source) => source.fetch(index).await.map_err(|e| {
                // keep the failing position even if the adapter didn't attribute it
                match e {
                    TabulaError::Query(q) if q.page_position().is_some() => TabulaError::Query(q),
                    other => TabulaError::Query(QueryError::PageFetchFailed {
                        position: index,
                        message: other.to_string(),
                    }),
                }
            })?,
            CursorSource::Sequential { records, page_size } => {
                let start = index * *page_size;
                let end = (start + *page_size).min(records.len());
                Page::new(index, records[start..end].to_vec())
            }
        };

        if page.index != index {
            return Err(TabulaError::Query(QueryError::InvalidResponse(format!(
                "expected page {} but provider returned page {}",
                index, page.index
            ))));
        }

        self.next_index += 1;
        Ok(Some(page))
    }
}
