//! Streaming delimited-text serialization
//!
//! Emits the header line at `begin` and one line per row at `write_row`,
//! directly to the sink, so memory stays bounded regardless of row count.
//! Lines end with `\n`; there is no trailing delimiter. Cell values are not
//! quote-escaped: a value containing the active delimiter corrupts the line
//! structure. That is a documented limitation of this encoding, not
//! something this writer papers over.

use crate::adapters::sink::OutputSink;
use crate::domain::column::ColumnSpec;
use crate::domain::record::ResolvedRow;
use crate::domain::{Result, TabulaError};
use async_trait::async_trait;

use super::{ExportOutput, RowSerializer};

/// Streaming writer for delimiter-separated text
pub struct DelimitedSerializer {
    delimiter: char,
    rows_written: usize,
    began: bool,
}

impl DelimitedSerializer {
    /// Creates a serializer using the given field delimiter
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            rows_written: 0,
            began: false,
        }
    }

    fn line<I, S>(&self, cells: I) -> String
    where
        I: Iterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        for (i, cell) in cells.enumerate() {
            if i > 0 {
                line.push(self.delimiter);
            }
            line.push_str(cell.as_ref());
        }
        line.push('\n');
        line
    }
}

#[async_trait]
impl RowSerializer for DelimitedSerializer {
    async fn begin(&mut self, columns: &[ColumnSpec], sink: &mut dyn OutputSink) -> Result<()> {
        if self.began {
            return Err(TabulaError::IllegalState(
                "serializer already began".to_string(),
            ));
        }
        self.began = true;

        let header = self.line(columns.iter().map(ColumnSpec::header));
        sink.write_chunk(header.as_bytes()).await
    }

    async fn write_row(&mut self, row: &ResolvedRow, sink: &mut dyn OutputSink) -> Result<()> {
        if !self.began {
            return Err(TabulaError::IllegalState(
                "write_row before begin".to_string(),
            ));
        }

        let line = self.line(row.cells().iter());
        sink.write_chunk(line.as_bytes()).await?;
        self.rows_written += 1;
        Ok(())
    }

    async fn finish(&mut self, sink: &mut dyn OutputSink) -> Result<ExportOutput> {
        sink.flush().await?;
        Ok(ExportOutput {
            rows_written: self.rows_written,
            payload_bytes: None,
        })
    }

    fn discard(&mut self) {
        // nothing buffered; already-streamed lines are the consumer's problem
    }
}
