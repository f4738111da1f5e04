//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results,
//! including the job's terminal state and diagnostics for failures.

use crate::domain::ids::JobId;
use crate::domain::TabulaError;
use std::time::Duration;

/// Lifecycle state of an export job
///
/// Jobs progress `Idle → Validating → Paginating → Serializing → Done`;
/// `Failed` is the absorbing state reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, nothing checked yet
    Idle,
    /// Input checks running; no query has executed
    Validating,
    /// Pages are being fetched, resolved, formatted and handed to the
    /// serializer
    Paginating,
    /// Pagination ended; the serializer is completing its output
    Serializing,
    /// Output delivered to the sink
    Done,
    /// Aborted; diagnostics captured in the summary
    Failed,
}

/// Classification of an export failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorKind {
    /// Bad or missing caller input
    Validation,
    /// Query provider failure
    Query,
    /// Output rendering failure
    Serialization,
    /// Output destination failure
    Sink,
    /// Anything else
    Other,
}

/// One captured export failure
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Failure classification
    pub kind: ExportErrorKind,

    /// Human-readable message, safe to show to the caller
    pub message: String,
}

impl ExportError {
    /// Create a new export error
    pub fn new(kind: ExportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&TabulaError> for ExportError {
    fn from(err: &TabulaError) -> Self {
        let kind = match err {
            TabulaError::Validation(_) | TabulaError::Configuration(_) => {
                ExportErrorKind::Validation
            }
            TabulaError::Query(_) => ExportErrorKind::Query,
            TabulaError::Serialization(_) => ExportErrorKind::Serialization,
            TabulaError::Sink(_) | TabulaError::Io(_) => ExportErrorKind::Sink,
            _ => ExportErrorKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

/// Summary of one export job
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Job this summary belongs to
    pub job_id: JobId,

    /// Entity type the job queried
    pub entity_type: String,

    /// Terminal (or current) lifecycle state
    pub state: JobState,

    /// Data rows handed to the serializer
    pub rows_exported: usize,

    /// Pages fetched from the provider
    pub pages_fetched: usize,

    /// Total pages the execution reported up front
    pub total_pages: usize,

    /// Position of the last successfully processed page
    pub last_page_position: Option<usize>,

    /// Rendered payload size, for buffered encodings
    pub payload_bytes: Option<usize>,

    /// True when the job stopped because the consumer went away
    pub interrupted: bool,

    /// The failure that aborted the job, if any
    pub error: Option<ExportError>,

    /// Duration of the job
    pub duration: Duration,
}

impl ExportSummary {
    /// Create a new summary in the idle state
    pub fn new(job_id: JobId, entity_type: impl Into<String>) -> Self {
        Self {
            job_id,
            entity_type: entity_type.into(),
            state: JobState::Idle,
            rows_exported: 0,
            pages_fetched: 0,
            total_pages: 0,
            last_page_position: None,
            payload_bytes: None,
            interrupted: false,
            error: None,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Transition to `Failed`, capturing the originating error
    pub fn fail(&mut self, error: &TabulaError) {
        self.state = JobState::Failed;
        self.error = Some(ExportError::from(error));
    }

    /// True when the job reached `Done`
    pub fn is_successful(&self) -> bool {
        self.state == JobState::Done
    }

    /// Log the summary with structured fields
    pub fn log_summary(&self) {
        if self.is_successful() {
            tracing::info!(
                job_id = %self.job_id,
                entity_type = %self.entity_type,
                rows = self.rows_exported,
                pages = self.pages_fetched,
                duration_ms = self.duration.as_millis() as u64,
                "Export completed"
            );
        } else {
            tracing::error!(
                job_id = %self.job_id,
                entity_type = %self.entity_type,
                state = ?self.state,
                rows = self.rows_exported,
                last_page = ?self.last_page_position,
                interrupted = self.interrupted,
                error = self.error.as_ref().map(|e| e.message.as_str()),
                "Export did not complete"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_summary_is_idle() {
        let summary = ExportSummary::new(JobId::generate(), "invoice");
        assert_eq!(summary.state, JobState::Idle);
        assert_eq!(summary.rows_exported, 0);
        assert!(summary.error.is_none());
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_fail_captures_kind_and_message() {
        let mut summary = ExportSummary::new(JobId::generate(), "invoice");
        summary.fail(&TabulaError::Validation("columns are required".to_string()));

        assert_eq!(summary.state, JobState::Failed);
        let error = summary.error.as_ref().unwrap();
        assert_eq!(error.kind, ExportErrorKind::Validation);
        assert!(error.message.contains("columns are required"));
    }

    #[test]
    fn test_error_kind_mapping() {
        use crate::domain::QueryError;

        let query_err = TabulaError::Query(QueryError::PageFetchFailed {
            position: 2,
            message: "reset".to_string(),
        });
        assert_eq!(ExportError::from(&query_err).kind, ExportErrorKind::Query);

        let ser_err = TabulaError::Serialization("render failed".to_string());
        assert_eq!(
            ExportError::from(&ser_err).kind,
            ExportErrorKind::Serialization
        );

        let sink_err = TabulaError::Sink("disk full".to_string());
        assert_eq!(ExportError::from(&sink_err).kind, ExportErrorKind::Sink);
    }

    #[test]
    fn test_is_successful_only_when_done() {
        let mut summary = ExportSummary::new(JobId::generate(), "invoice");
        summary.state = JobState::Serializing;
        assert!(!summary.is_successful());
        summary.state = JobState::Done;
        assert!(summary.is_successful());
    }

    #[test]
    fn test_with_duration() {
        let summary = ExportSummary::new(JobId::generate(), "invoice")
            .with_duration(Duration::from_millis(1500));
        assert_eq!(summary.duration, Duration::from_millis(1500));
    }
}
