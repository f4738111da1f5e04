//! Row serialization
//!
//! Converts a header and formatted rows into one of two output encodings
//! behind a single trait: [`DelimitedSerializer`] streams `\n`-terminated
//! lines to the sink as rows arrive, [`WorkbookSerializer`] buffers rows and
//! renders a complete xlsx workbook at the end. The job driver is agnostic
//! to which one it drives.

pub mod delimited;
pub mod workbook;

use crate::adapters::sink::OutputSink;
use crate::domain::column::ColumnSpec;
use crate::domain::record::ResolvedRow;
use crate::domain::Result;
use async_trait::async_trait;

pub use delimited::DelimitedSerializer;
pub use workbook::WorkbookSerializer;

/// MIME type of a rendered workbook document
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// What a finished serialization produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    /// Data rows written (header not counted)
    pub rows_written: usize,

    /// Size of the rendered document payload, for buffered encodings
    pub payload_bytes: Option<usize>,
}

/// Serializes a header and rows into an output encoding
///
/// Call order is `begin` once, `write_row` per row, `finish` once. The
/// column-order invariant holds across implementations: header cell *i* and
/// every row cell *i* refer to the same column.
#[async_trait]
pub trait RowSerializer: Send {
    /// Starts the output with the header row
    ///
    /// # Errors
    ///
    /// Returns a sink or serialization error.
    async fn begin(&mut self, columns: &[ColumnSpec], sink: &mut dyn OutputSink) -> Result<()>;

    /// Adds one data row
    ///
    /// # Errors
    ///
    /// Returns a sink or serialization error.
    async fn write_row(&mut self, row: &ResolvedRow, sink: &mut dyn OutputSink) -> Result<()>;

    /// Completes the output and reports what was produced
    ///
    /// # Errors
    ///
    /// Returns a sink or serialization error.
    async fn finish(&mut self, sink: &mut dyn OutputSink) -> Result<ExportOutput>;

    /// Drops any buffered output after a cancelled job
    ///
    /// A cancelled buffered encoding must never emit a partial document;
    /// streaming encodings have nothing to drop.
    fn discard(&mut self);
}
