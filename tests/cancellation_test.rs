//! Integration tests for export cancellation
//!
//! These tests verify that:
//! - Shutdown signals are observed at page boundaries
//! - A cancelled streaming job stops fetching further pages
//! - A cancelled workbook job never emits a partial document

use std::sync::Arc;
use tabula::adapters::sink::BufferSink;
use tabula::core::export::{ExportDriver, ExportJobBuilder, JobState};
use tabula::domain::query::QuerySpec;
use tabula::domain::{ColumnSpec, FieldValue, Page, RawRecord, Result};
use tokio::sync::watch;

use async_trait::async_trait;
use tabula::adapters::provider::{PageSource, QueryProvider};

/// Provider that flips a cancel flag after serving its first page,
/// simulating a consumer that goes away mid-export
struct CancellingProvider {
    cancel_tx: watch::Sender<bool>,
    total_pages: usize,
}

#[derive(Debug)]
struct CancellingSource {
    cancel_tx: watch::Sender<bool>,
    total_pages: usize,
}

#[async_trait]
impl PageSource for CancellingSource {
    fn total_pages(&self) -> usize {
        self.total_pages
    }

    fn total_records(&self) -> usize {
        self.total_pages * 2
    }

    async fn fetch(&mut self, index: usize) -> Result<Page> {
        if index == 0 {
            // the consumer disappears while this page is being processed
            let _ = self.cancel_tx.send(true);
        }
        let records = (0..2)
            .map(|i| RawRecord::new().field("n", FieldValue::raw(format!("{index}-{i}"))))
            .collect();
        Ok(Page::new(index, records))
    }
}

#[async_trait]
impl QueryProvider for CancellingProvider {
    async fn execute(&self, _spec: &QuerySpec, _page_size: usize) -> Result<Box<dyn PageSource>> {
        Ok(Box::new(CancellingSource {
            cancel_tx: self.cancel_tx.clone(),
            total_pages: self.total_pages,
        }))
    }

    async fn run(&self, _spec: &QuerySpec) -> Result<Vec<RawRecord>> {
        unimplemented!("paged only")
    }
}

#[tokio::test]
async fn test_shutdown_signal_channel_round_trip() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    assert!(!*shutdown_rx.borrow());
    shutdown_tx.send(true).unwrap();
    assert!(*shutdown_rx.borrow());
}

#[tokio::test]
async fn test_cancellation_caps_wasted_work_at_one_page() {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let provider = Arc::new(CancellingProvider {
        cancel_tx,
        total_pages: 50,
    });
    let driver = ExportDriver::new(provider).with_cancel_signal(cancel_rx);

    let job = ExportJobBuilder::new()
        .entity_type("T")
        .columns(vec![ColumnSpec::new("n").with_label("N")])
        .delimited(';')
        .page_size(2)
        .build()
        .unwrap();

    let mut sink = BufferSink::new();
    let handle = sink.handle();
    let summary = driver.run(&job, &mut sink).await;

    assert_eq!(summary.state, JobState::Failed);
    assert!(summary.interrupted);
    // The first page was already in flight when the signal arrived; the
    // check at the next boundary stops everything after it
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(handle.stream_text(), "N\n0-0\n0-1\n");
}

#[tokio::test]
async fn test_cancelled_workbook_job_discards_buffer() {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let provider = Arc::new(CancellingProvider {
        cancel_tx,
        total_pages: 50,
    });
    let driver = ExportDriver::new(provider).with_cancel_signal(cancel_rx);

    let job = ExportJobBuilder::new()
        .entity_type("T")
        .columns(vec![ColumnSpec::new("n").with_label("N")])
        .workbook("Report")
        .file_name("report.xlsx")
        .page_size(2)
        .build()
        .unwrap();

    let mut sink = BufferSink::new();
    let handle = sink.handle();
    let summary = driver.run(&job, &mut sink).await;

    assert!(summary.interrupted);
    assert!(
        handle.documents().is_empty(),
        "partial workbooks are never emitted"
    );
}

#[tokio::test]
async fn test_uncancelled_job_completes_normally() {
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let records: Vec<RawRecord> = (0..4)
        .map(|i| RawRecord::new().field("n", FieldValue::raw(i.to_string())))
        .collect();
    let provider = Arc::new(tabula::adapters::provider::StaticProvider::new(records));
    let driver = ExportDriver::new(provider).with_cancel_signal(cancel_rx);

    let job = ExportJobBuilder::new()
        .entity_type("T")
        .columns(vec![ColumnSpec::new("n").with_label("N")])
        .delimited(';')
        .page_size(2)
        .build()
        .unwrap();

    let mut sink = BufferSink::new();
    let summary = driver.run(&job, &mut sink).await;
    assert_eq!(summary.state, JobState::Done);
    assert!(!summary.interrupted);
}
