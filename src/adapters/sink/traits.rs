//! Output sink abstraction
//!
//! A sink is the destination of serialized output. It offers two shapes:
//! an incremental byte writer for streamed encodings, and a file-creation
//! capability taking a name, a MIME-type tag and full contents for buffered
//! encodings. One sink is exclusively owned by one export job for its
//! lifetime.

use crate::domain::Result;
use async_trait::async_trait;

/// Destination for serialized export output
#[async_trait]
pub trait OutputSink: Send {
    /// Appends a chunk to the incremental output stream
    ///
    /// # Errors
    ///
    /// Returns a sink error if the chunk cannot be written.
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()>;

    /// Persists a complete document under the given name
    ///
    /// # Arguments
    ///
    /// * `name` - File name for the document
    /// * `content_type` - MIME-type tag, e.g.
    ///   `application/vnd.openxmlformats-officedocument.spreadsheetml.sheet`
    /// * `contents` - Full document bytes
    ///
    /// # Errors
    ///
    /// Returns a sink error if the document cannot be persisted.
    async fn persist_file(&mut self, name: &str, content_type: &str, contents: &[u8])
        -> Result<()>;

    /// Flushes any buffered stream output
    ///
    /// # Errors
    ///
    /// Returns a sink error if flushing fails.
    async fn flush(&mut self) -> Result<()>;

    /// True once the downstream consumer has hung up
    ///
    /// Checked by the job driver at page boundaries; a closed sink stops
    /// further page fetches and writes.
    fn is_closed(&self) -> bool;
}
