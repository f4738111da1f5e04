//! Buffered workbook serialization
//!
//! Collects the header and every row in an in-memory sheet buffer, then
//! renders a single-sheet xlsx workbook as one binary payload at `finish`
//! and persists it through the sink's file capability. Memory use is
//! O(total rows), the trade-off against the streaming encoding. A cancelled
//! job discards the buffer; a partial workbook is never emitted.

use crate::adapters::sink::OutputSink;
use crate::domain::column::ColumnSpec;
use crate::domain::record::ResolvedRow;
use crate::domain::{Result, TabulaError};
use async_trait::async_trait;
use rust_xlsxwriter::Workbook;

use super::{ExportOutput, RowSerializer, XLSX_CONTENT_TYPE};

/// Buffered writer rendering a single-sheet xlsx workbook
pub struct WorkbookSerializer {
    sheet_name: String,
    file_name: String,
    rows: Vec<Vec<String>>,
    began: bool,
}

impl WorkbookSerializer {
    /// Creates a serializer producing `file_name` with one sheet named
    /// `sheet_name`
    pub fn new(sheet_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            file_name: file_name.into(),
            rows: Vec::new(),
            began: false,
        }
    }

    /// Rows currently buffered, header included
    pub fn buffered_rows(&self) -> usize {
        self.rows.len()
    }

    /// Renders the buffered sheet into a workbook payload
    fn render(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.sheet_name)
            .map_err(|e| TabulaError::Serialization(format!("invalid sheet name: {e}")))?;

        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                worksheet
                    .write_string(r as u32, c as u16, cell.as_str())
                    .map_err(|e| {
                        TabulaError::Serialization(format!(
                            "failed to write cell ({r}, {c}): {e}"
                        ))
                    })?;
            }
        }

        workbook
            .save_to_buffer()
            .map_err(|e| TabulaError::Serialization(format!("failed to render workbook: {e}")))
    }
}

#[async_trait]
impl RowSerializer for WorkbookSerializer {
    async fn begin(&mut self, columns: &[ColumnSpec], _sink: &mut dyn OutputSink) -> Result<()> {
        if self.began {
            return Err(TabulaError::IllegalState(
                "serializer already began".to_string(),
            ));
        }
        self.began = true;

        let header = columns
            .iter()
            .map(|c| c.header().to_string())
            .collect::<Vec<_>>();
        self.rows.push(header);
        Ok(())
    }

    async fn write_row(&mut self, row: &ResolvedRow, _sink: &mut dyn OutputSink) -> Result<()> {
        if !self.began {
            return Err(TabulaError::IllegalState(
                "write_row before begin".to_string(),
            ));
        }
        self.rows.push(row.cells().to_vec());
        Ok(())
    }

    async fn finish(&mut self, sink: &mut dyn OutputSink) -> Result<ExportOutput> {
        let payload = self.render()?;
        let rows_written = self.rows.len().saturating_sub(1);

        tracing::debug!(
            sheet = %self.sheet_name,
            rows = rows_written,
            bytes = payload.len(),
            "Rendered workbook"
        );

        sink.persist_file(&self.file_name, XLSX_CONTENT_TYPE, &payload)
            .await?;

        Ok(ExportOutput {
            rows_written,
            payload_bytes: Some(payload.len()),
        })
    }

    fn discard(&mut self) {
        self.rows.clear();
    }
}
