//! In-memory output sink
//!
//! Buffers stream chunks and persisted documents in shared memory. Used by
//! tests to observe exactly what a job emitted, and to simulate a downstream
//! consumer hanging up mid-export.

use crate::domain::{Result, TabulaError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::traits::OutputSink;

/// A document persisted through the file capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDocument {
    /// File name the document was persisted under
    pub name: String,
    /// MIME-type tag
    pub content_type: String,
    /// Full document bytes
    pub contents: Vec<u8>,
}

#[derive(Debug, Default)]
struct BufferState {
    stream: Vec<u8>,
    documents: Vec<PersistedDocument>,
    closed: bool,
}

/// Shared handle for inspecting a [`BufferSink`] after the job consumed it
#[derive(Debug, Clone, Default)]
pub struct BufferHandle {
    state: Arc<Mutex<BufferState>>,
}

impl BufferHandle {
    /// The streamed bytes written so far
    pub fn stream_bytes(&self) -> Vec<u8> {
        self.state.lock().expect("buffer lock").stream.clone()
    }

    /// The streamed bytes interpreted as UTF-8
    pub fn stream_text(&self) -> String {
        String::from_utf8_lossy(&self.stream_bytes()).into_owned()
    }

    /// Documents persisted through the file capability
    pub fn documents(&self) -> Vec<PersistedDocument> {
        self.state.lock().expect("buffer lock").documents.clone()
    }

    /// Simulates the downstream consumer closing its connection
    pub fn close(&self) {
        self.state.lock().expect("buffer lock").closed = true;
    }
}

/// Output sink buffering everything in memory
#[derive(Debug, Default)]
pub struct BufferSink {
    state: Arc<Mutex<BufferState>>,
}

impl BufferSink {
    /// Creates an empty buffer sink
    pub fn new() -> Self {
        Self::default()
    }

    /// A shared handle usable after the sink moved into a job
    pub fn handle(&self) -> BufferHandle {
        BufferHandle {
            state: self.state.clone(),
        }
    }
}

#[async_trait]
impl OutputSink for BufferSink {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let mut state = self.state.lock().expect("buffer lock");
        if state.closed {
            return Err(TabulaError::Sink("consumer closed the stream".to_string()));
        }
        state.stream.extend_from_slice(chunk);
        Ok(())
    }

    async fn persist_file(
        &mut self,
        name: &str,
        content_type: &str,
        contents: &[u8],
    ) -> Result<()> {
        let mut state = self.state.lock().expect("buffer lock");
        if state.closed {
            return Err(TabulaError::Sink("consumer closed the stream".to_string()));
        }
        state.documents.push(PersistedDocument {
            name: name.to_string(),
            content_type: content_type.to_string(),
            contents: contents.to_vec(),
        });
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.lock().expect("buffer lock").closed
    }
}
