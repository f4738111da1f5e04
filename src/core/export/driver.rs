//! Export job driver
//!
//! The driver runs one [`ExportJob`] through its lifecycle:
//! `Idle → Validating → Paginating → Serializing → Done`, with `Failed` as
//! the absorbing state for any unrecovered error. Rows flow one at a time:
//! each record is resolved, formatted and handed to the serializer without
//! waiting for the rest of its page. Cancellation (a watch flag or the sink
//! reporting its consumer gone) is checked at page boundaries, capping
//! wasted work at one page; a cancelled buffered job discards its output.
//!
//! The driver performs no retries. A caller wanting retry-on-transient-
//! failure wraps the provider, not this state machine.

use crate::adapters::provider::QueryProvider;
use crate::adapters::sink::OutputSink;
use crate::core::format::resolve_row;
use crate::core::query::{validate_page_size, PageCursor, PaginatorOptions};
use crate::core::serialize::{DelimitedSerializer, RowSerializer, WorkbookSerializer};
use crate::domain::{Result, TabulaError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use super::job::{ExportJob, OutputFormat};
use super::summary::{ExportSummary, JobState};

/// Drives export jobs against a query provider
pub struct ExportDriver {
    provider: Arc<dyn QueryProvider>,
    options: PaginatorOptions,
    cancel: Option<watch::Receiver<bool>>,
}

impl ExportDriver {
    /// Creates a driver with default pagination options
    pub fn new(provider: Arc<dyn QueryProvider>) -> Self {
        Self {
            provider,
            options: PaginatorOptions::default(),
            cancel: None,
        }
    }

    /// Overrides the pagination options
    pub fn with_options(mut self, options: PaginatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches a cancellation signal, checked at page boundaries
    pub fn with_cancel_signal(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Runs a job using the provider's paged execution
    ///
    /// Always returns a summary; failures are captured in it rather than
    /// escaping as errors, so the transport layer only ever sees readable
    /// messages.
    pub async fn run(&self, job: &ExportJob, sink: &mut dyn OutputSink) -> ExportSummary {
        let start = Instant::now();
        let mut summary = ExportSummary::new(job.id.clone(), job.query.entity_type.as_str());

        summary.state = JobState::Validating;
        if let Err(e) = self.validate(job) {
            tracing::warn!(
                job_id = %job.id,
                entity_type = %job.query.entity_type,
                error = %e,
                "Job rejected during validation; no query executed"
            );
            summary.fail(&e);
            return summary.with_duration(start.elapsed());
        }

        summary.state = JobState::Paginating;
        let mut cursor = match PageCursor::open(
            self.provider.as_ref(),
            &job.query,
            job.page_size,
            &self.options,
        )
        .await
        {
            Ok(cursor) => cursor,
            Err(e) => {
                tracing::error!(
                    job_id = %job.id,
                    entity_type = %job.query.entity_type,
                    error = %e,
                    "Failed to open query execution"
                );
                summary.fail(&e);
                return summary.with_duration(start.elapsed());
            }
        };

        self.drive(job, &mut cursor, sink, &mut summary).await;

        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        summary
    }

    /// Runs a job through the provider's non-paged shape
    ///
    /// Intended for small fixed result sets; the materialized records are
    /// chunked locally so the rest of the pipeline is identical to a paged
    /// run.
    pub async fn run_sequential(&self, job: &ExportJob, sink: &mut dyn OutputSink) -> ExportSummary {
        let start = Instant::now();
        let mut summary = ExportSummary::new(job.id.clone(), job.query.entity_type.as_str());

        summary.state = JobState::Validating;
        if let Err(e) = self.validate(job) {
            tracing::warn!(
                job_id = %job.id,
                entity_type = %job.query.entity_type,
                error = %e,
                "Job rejected during validation; no query executed"
            );
            summary.fail(&e);
            return summary.with_duration(start.elapsed());
        }

        summary.state = JobState::Paginating;
        let records = match self.provider.run(&job.query).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    job_id = %job.id,
                    entity_type = %job.query.entity_type,
                    error = %e,
                    "Sequential query failed"
                );
                summary.fail(&e);
                return summary.with_duration(start.elapsed());
            }
        };

        let mut cursor = match PageCursor::from_records(records, job.page_size, &self.options) {
            Ok(cursor) => cursor,
            Err(e) => {
                summary.fail(&e);
                return summary.with_duration(start.elapsed());
            }
        };

        self.drive(job, &mut cursor, sink, &mut summary).await;

        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        summary
    }

    /// Input checks; must pass before any query executes
    fn validate(&self, job: &ExportJob) -> Result<()> {
        validate_page_size(job.page_size, &self.options)?;
        crate::domain::column::validate_columns(&job.query.columns)
            .map_err(TabulaError::Validation)?;
        job.query
            .filter
            .validate()
            .map_err(TabulaError::Validation)?;
        if job.file_name.trim().is_empty() {
            return Err(TabulaError::Validation(
                "output file name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn serializer_for(job: &ExportJob) -> Box<dyn RowSerializer> {
        match &job.format {
            OutputFormat::Delimited { delimiter } => {
                Box::new(DelimitedSerializer::new(*delimiter))
            }
            OutputFormat::Workbook { sheet_name } => Box::new(WorkbookSerializer::new(
                sheet_name.clone(),
                job.file_name.clone(),
            )),
        }
    }

    /// Pumps pages from the cursor through resolution, formatting and
    /// serialization until the cursor ends, the job is cancelled or an
    /// error aborts it
    async fn drive(
        &self,
        job: &ExportJob,
        cursor: &mut PageCursor,
        sink: &mut dyn OutputSink,
        summary: &mut ExportSummary,
    ) {
        let mut serializer = Self::serializer_for(job);
        summary.total_pages = cursor.total_pages();

        if let Err(e) = serializer.begin(&job.query.columns, sink).await {
            serializer.discard();
            summary.fail(&e);
            return;
        }

        loop {
            if self.is_cancelled() || sink.is_closed() {
                serializer.discard();
                summary.interrupted = true;
                summary.state = JobState::Failed;
                tracing::warn!(
                    job_id = %job.id,
                    entity_type = %job.query.entity_type,
                    pages_fetched = summary.pages_fetched,
                    "Export cancelled at page boundary"
                );
                return;
            }

            let page = match cursor.next().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => {
                    serializer.discard();
                    tracing::error!(
                        job_id = %job.id,
                        entity_type = %job.query.entity_type,
                        last_page = ?summary.last_page_position,
                        error = %e,
                        "Pagination aborted"
                    );
                    summary.fail(&e);
                    return;
                }
            };

            for record in &page.records {
                let row = resolve_row(record, &job.query.columns, &job.format_options);
                if let Err(e) = serializer.write_row(&row, sink).await {
                    serializer.discard();
                    tracing::error!(
                        job_id = %job.id,
                        entity_type = %job.query.entity_type,
                        page = page.index,
                        error = %e,
                        "Row serialization aborted"
                    );
                    summary.fail(&e);
                    return;
                }
                summary.rows_exported += 1;
            }

            summary.pages_fetched += 1;
            summary.last_page_position = Some(page.index);
        }

        summary.state = JobState::Serializing;
        match serializer.finish(sink).await {
            Ok(output) => {
                summary.payload_bytes = output.payload_bytes;
                summary.state = JobState::Done;
            }
            Err(e) => {
                tracing::error!(
                    job_id = %job.id,
                    entity_type = %job.query.entity_type,
                    error = %e,
                    "Failed to complete output"
                );
                summary.fail(&e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::provider::StaticProvider;
    use crate::adapters::sink::BufferSink;
    use crate::core::export::job::ExportJobBuilder;
    use crate::core::export::summary::ExportErrorKind;
    use crate::domain::{ColumnSpec, FieldValue, RawRecord};

    fn records(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| {
                RawRecord::new()
                    .field("a", FieldValue::raw(format!("a{i}")))
                    .field("b", FieldValue::raw(format!("b{i}")))
            })
            .collect()
    }

    fn job() -> ExportJob {
        ExportJobBuilder::new()
            .entity_type("T")
            .columns(vec![
                ColumnSpec::new("a").with_label("A"),
                ColumnSpec::new("b").with_label("B"),
            ])
            .delimited(';')
            .page_size(3)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_delimited_export_reaches_done() {
        let provider = Arc::new(StaticProvider::new(records(4)));
        let driver = ExportDriver::new(provider);
        let mut sink = BufferSink::new();
        let handle = sink.handle();

        let summary = driver.run(&job(), &mut sink).await;

        assert_eq!(summary.state, JobState::Done);
        assert_eq!(summary.rows_exported, 4);
        assert_eq!(summary.pages_fetched, 2);
        assert_eq!(
            handle.stream_text(),
            "A;B\na0;b0\na1;b1\na2;b2\na3;b3\n"
        );
    }

    #[tokio::test]
    async fn test_invalid_page_size_fails_without_querying() {
        let provider = Arc::new(StaticProvider::new(records(1)));
        let counter = provider.query_counter();
        let driver =
            ExportDriver::new(provider).with_options(PaginatorOptions { max_page_size: 10 });

        let mut bad_job = job();
        bad_job.page_size = 11;

        let mut sink = BufferSink::new();
        let summary = driver.run(&bad_job, &mut sink).await;

        assert_eq!(summary.state, JobState::Failed);
        assert_eq!(
            summary.error.as_ref().unwrap().kind,
            ExportErrorKind::Validation
        );
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_page() {
        let provider = Arc::new(StaticProvider::new(records(10)));
        let (tx, rx) = watch::channel(false);
        let driver = ExportDriver::new(provider).with_cancel_signal(rx);
        tx.send(true).unwrap();

        let mut sink = BufferSink::new();
        let handle = sink.handle();
        let summary = driver.run(&job(), &mut sink).await;

        assert_eq!(summary.state, JobState::Failed);
        assert!(summary.interrupted);
        assert_eq!(summary.pages_fetched, 0);
        // only the header may have reached the stream before the boundary check
        assert_eq!(handle.stream_text(), "A;B\n");
    }

    #[tokio::test]
    async fn test_closed_sink_interrupts_workbook_without_document() {
        let provider = Arc::new(StaticProvider::new(records(5)));
        let driver = ExportDriver::new(provider);

        let wb_job = ExportJobBuilder::new()
            .entity_type("T")
            .columns(vec![ColumnSpec::new("a").with_label("A")])
            .workbook("Report")
            .file_name("report.xlsx")
            .page_size(2)
            .build()
            .unwrap();

        let mut sink = BufferSink::new();
        let handle = sink.handle();
        handle.close();

        let summary = driver.run(&wb_job, &mut sink).await;

        assert!(summary.interrupted);
        assert!(handle.documents().is_empty(), "no partial workbook emitted");
    }

    #[tokio::test]
    async fn test_workbook_export_persists_document() {
        let provider = Arc::new(StaticProvider::new(records(3)));
        let driver = ExportDriver::new(provider);

        let wb_job = ExportJobBuilder::new()
            .entity_type("T")
            .columns(vec![
                ColumnSpec::new("a").with_label("A"),
                ColumnSpec::new("b").with_label("B"),
            ])
            .workbook("Report")
            .file_name("report.xlsx")
            .page_size(2)
            .build()
            .unwrap();

        let mut sink = BufferSink::new();
        let handle = sink.handle();
        let summary = driver.run(&wb_job, &mut sink).await;

        assert_eq!(summary.state, JobState::Done);
        assert_eq!(summary.rows_exported, 3);
        let docs = handle.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "report.xlsx");
        assert!(summary.payload_bytes.unwrap() > 0);
    }

    #[tokio::test]
    async fn test_sequential_run_matches_paged_output() {
        let provider = Arc::new(StaticProvider::new(records(4)));
        let driver = ExportDriver::new(provider);

        let mut sink = BufferSink::new();
        let handle = sink.handle();
        let summary = driver.run_sequential(&job(), &mut sink).await;

        assert_eq!(summary.state, JobState::Done);
        assert_eq!(summary.rows_exported, 4);
        assert_eq!(
            handle.stream_text(),
            "A;B\na0;b0\na1;b1\na2;b2\na3;b3\n"
        );
    }

    #[tokio::test]
    async fn test_mid_traversal_failure_captures_last_good_page() {
        use crate::adapters::provider::{PageSource, QueryProvider};
        use crate::domain::query::QuerySpec;
        use crate::domain::{Page, QueryError, Result};
        use async_trait::async_trait;

        #[derive(Debug)]
        struct FlakySource {
            served: usize,
        }

        #[async_trait]
        impl PageSource for FlakySource {
            fn total_pages(&self) -> usize {
                3
            }
            fn total_records(&self) -> usize {
                3
            }
            async fn fetch(&mut self, index: usize) -> Result<Page> {
                if index < 2 {
                    self.served += 1;
                    Ok(Page::new(index, records(1)))
                } else {
                    Err(QueryError::PageFetchFailed {
                        position: index,
                        message: "transient fault".to_string(),
                    }
                    .into())
                }
            }
        }

        struct FlakyProvider;

        #[async_trait]
        impl QueryProvider for FlakyProvider {
            async fn execute(
                &self,
                _spec: &QuerySpec,
                _page_size: usize,
            ) -> Result<Box<dyn PageSource>> {
                Ok(Box::new(FlakySource { served: 0 }))
            }
            async fn run(&self, _spec: &QuerySpec) -> Result<Vec<RawRecord>> {
                unimplemented!("paged only")
            }
        }

        let driver = ExportDriver::new(Arc::new(FlakyProvider));
        let mut sink = BufferSink::new();
        let summary = driver.run(&job(), &mut sink).await;

        assert_eq!(summary.state, JobState::Failed);
        assert_eq!(summary.last_page_position, Some(1));
        let error = summary.error.as_ref().unwrap();
        assert_eq!(error.kind, ExportErrorKind::Query);
        assert!(error.message.contains("page 2"));
    }
}
