//! File system output sink
//!
//! Streams chunks into a file inside a target directory and persists
//! complete documents via a temp-file-then-rename so a crashed job never
//! leaves a half-written document under the final name.

use crate::domain::{Result, TabulaError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

use super::traits::OutputSink;

/// Output sink writing into a directory on the local file system
pub struct FileSink {
    directory: PathBuf,
    stream_file_name: String,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// Creates a sink targeting `directory`
    ///
    /// `stream_file_name` is used for incremental output; documents persisted
    /// through the file capability carry their own names.
    pub fn new(directory: impl Into<PathBuf>, stream_file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            stream_file_name: stream_file_name.into(),
            writer: None,
        }
    }

    /// Path the incremental stream is written to
    pub fn stream_path(&self) -> PathBuf {
        self.directory.join(&self.stream_file_name)
    }

    async fn ensure_writer(&mut self) -> Result<&mut BufWriter<File>> {
        if self.writer.is_none() {
            fs::create_dir_all(&self.directory).await.map_err(|e| {
                TabulaError::Sink(format!(
                    "Failed to create output directory {}: {}",
                    self.directory.display(),
                    e
                ))
            })?;
            let path = self.stream_path();
            let file = File::create(&path).await.map_err(|e| {
                TabulaError::Sink(format!("Failed to create {}: {}", path.display(), e))
            })?;
            tracing::debug!(path = %path.display(), "Opened stream output file");
            self.writer = Some(BufWriter::new(file));
        }
        Ok(self.writer.as_mut().expect("writer just initialized"))
    }
}

/// Temp path beside the target, for atomic persist
fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let file = tmp
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "export".to_string());
    tmp.set_file_name(format!("{file}.tmp"));
    tmp
}

#[async_trait]
impl OutputSink for FileSink {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let writer = self.ensure_writer().await?;
        writer
            .write_all(chunk)
            .await
            .map_err(|e| TabulaError::Sink(format!("Failed to write chunk: {e}")))
    }

    async fn persist_file(
        &mut self,
        name: &str,
        content_type: &str,
        contents: &[u8],
    ) -> Result<()> {
        fs::create_dir_all(&self.directory).await.map_err(|e| {
            TabulaError::Sink(format!(
                "Failed to create output directory {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        let path = self.directory.join(name);
        let tmp = tmp_path(&path);
        fs::write(&tmp, contents).await.map_err(|e| {
            TabulaError::Sink(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &path).await.map_err(|e| {
            TabulaError::Sink(format!("Failed to move {} into place: {}", tmp.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            content_type,
            bytes = contents.len(),
            "Persisted document"
        );
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .await
                .map_err(|e| TabulaError::Sink(format!("Failed to flush output: {e}")))?;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        // Local files have no consumer that can hang up
        false
    }
}
