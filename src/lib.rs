//! # Tabula - Tabular Record Export Engine
//!
//! Tabula exports tabular records from a hosted business-record store into
//! downloadable documents: streamed delimited text or xlsx workbooks. A job
//! is described by an entity type, filter descriptors (with exclusions), and
//! an ordered column projection; Tabula composes the filter expression,
//! paginates the result set with bounded memory, resolves and formats every
//! cell, and serializes the rows in column order.
//!
//! ## Architecture
//!
//! Tabula follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (pagination, formatting, serialization,
//!   job orchestration)
//! - [`adapters`] - External integrations (query provider, output sinks)
//! - [`request`] - Parameterized request boundary
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tabula::adapters::provider::HttpProvider;
//! use tabula::adapters::sink::FileSink;
//! use tabula::core::export::{ExportDriver, ExportJobBuilder};
//! use tabula::domain::ColumnSpec;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = tabula::config::load_config("tabula.toml")?;
//!
//!     let job = ExportJobBuilder::new()
//!         .entity_type("invoice")
//!         .columns(vec![
//!             ColumnSpec::new("tranid").with_label("Invoice Number"),
//!             ColumnSpec::new("currency").with_label("Currency"),
//!         ])
//!         .delimited(';')
//!         .build()?;
//!
//!     let provider = Arc::new(HttpProvider::new(&config.provider)?);
//!     let driver = ExportDriver::new(provider);
//!     let mut sink = FileSink::new("./exports", job.file_name.clone());
//!
//!     let summary = driver.run(&job, &mut sink).await;
//!     println!("Exported {} rows", summary.rows_exported);
//!     Ok(())
//! }
//! ```
//!
//! ## Filters and exclusions
//!
//! Filters are flat descriptors; exclusions are descriptors whose matches
//! must not appear in the result. Composition wraps every exclusion in a
//! negation, so the effective expression is always
//! `(base filters) AND NOT(each exclusion)`:
//!
//! ```rust
//! use tabula::domain::filter::{compose, FilterDescriptor};
//!
//! let base = vec![FilterDescriptor::new("mainline", "is", "T")];
//! let exclusions = vec![FilterDescriptor::new("status", "is", "voided")];
//! let tree = compose(&base, &exclusions).unwrap();
//! assert_eq!(tree.leaf_count(), 2);
//! ```
//!
//! ## Output encodings
//!
//! The delimited encoding streams rows to the sink as they arrive, keeping
//! memory bounded for arbitrarily large result sets. The workbook encoding
//! buffers all rows and renders one xlsx payload at the end - the memory
//! trade-off for a document format that cannot be streamed. Both preserve
//! column order end to end: header cell *i* and every row cell *i* belong
//! to the same column.
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`]; caller-input problems are
//! [`domain::TabulaError::Validation`] and are reported as readable messages
//! at the CLI boundary rather than raw errors.
//!
//! ## Logging
//!
//! Tabula uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(entity_type = "invoice", "Starting export");
//! warn!(page = 3, "Slow page fetch");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod request;
