//! Output sink adapters
//!
//! Serialized output leaves the engine through the [`OutputSink`] trait:
//! [`FileSink`] writes to the local file system, [`BufferSink`] collects
//! output in memory for tests and embedded callers.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileSink;
pub use memory::{BufferHandle, BufferSink, PersistedDocument};
pub use traits::OutputSink;
