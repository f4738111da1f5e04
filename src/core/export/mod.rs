//! Export orchestration
//!
//! Ties the pipeline together: a validated [`ExportJob`] is driven page by
//! page from the query provider, through value resolution and formatting,
//! into a serializer, ending in a [`ExportSummary`] that records the job's
//! terminal state.

pub mod driver;
pub mod job;
pub mod summary;

pub use driver::ExportDriver;
pub use job::{ExportJob, ExportJobBuilder, OutputFormat};
pub use summary::{ExportError, ExportErrorKind, ExportSummary, JobState};
