//! Export command implementation
//!
//! Builds an export request from CLI arguments, runs it against the
//! configured record store and writes the document into the output
//! directory.

use crate::adapters::provider::HttpProvider;
use crate::adapters::sink::FileSink;
use crate::config::load_config;
use crate::core::export::ExportDriver;
use crate::core::query::PaginatorOptions;
use crate::request::ExportRequest;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Entity type to query, e.g. "invoice"
    #[arg(long)]
    pub entity_type: Option<String>,

    /// JSON array of filter descriptors, e.g. '[["mainline","is","T"]]'
    #[arg(long)]
    pub filters: Option<String>,

    /// JSON array of exclusion filter descriptors; each is negated
    #[arg(long = "exclude")]
    pub exclusion_filters: Option<String>,

    /// JSON array of columns, e.g. '[{"name":"tranid","label":"Invoice"}]'
    #[arg(long)]
    pub columns: Option<String>,

    /// Range start in ddmmyyyy form
    #[arg(long)]
    pub start_date: Option<String>,

    /// Range end in ddmmyyyy form
    #[arg(long)]
    pub end_date: Option<String>,

    /// Field the date range applies to
    #[arg(long)]
    pub date_field: Option<String>,

    /// Output format: delimited or workbook
    #[arg(long)]
    pub format: Option<String>,

    /// Field separator for delimited output
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Sheet name for workbook output
    #[arg(long)]
    pub sheet_name: Option<String>,

    /// File name of the produced document
    #[arg(long)]
    pub file_name: Option<String>,

    /// Records per page during retrieval
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Override the output directory
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Use the provider's non-paged query shape (small result sets)
    #[arg(long)]
    pub sequential: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let request = ExportRequest {
            entity_type: self.entity_type.clone(),
            filters: self.filters.clone(),
            exclusion_filters: self.exclusion_filters.clone(),
            columns: self.columns.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            date_field: self.date_field.clone(),
            format: self.format.clone(),
            delimiter: self.delimiter.clone(),
            sheet_name: self.sheet_name.clone(),
            file_name: self.file_name.clone(),
            page_size: self.page_size.or(Some(config.provider.query.page_size)),
        };

        let job = match request.into_job(&config.export) {
            Ok(job) => job,
            Err(e) => {
                // Validation problems are user input problems: report the
                // message, not a stack of internals
                tracing::warn!(error = %e, "Export request rejected");
                eprintln!("Invalid export request: {e}");
                return Ok(2);
            }
        };

        let provider = match HttpProvider::new(&config.provider) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize query provider");
                eprintln!("Failed to initialize query provider: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let driver = ExportDriver::new(provider)
            .with_options(PaginatorOptions {
                max_page_size: config.provider.query.max_page_size,
            })
            .with_cancel_signal(shutdown_signal);

        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| config.export.output_dir.clone());
        let mut sink = FileSink::new(output_dir, job.file_name.clone());

        println!("🚀 Starting export...");
        println!();

        let summary = if self.sequential {
            driver.run_sequential(&job, &mut sink).await
        } else {
            driver.run(&job, &mut sink).await
        };

        println!();
        println!("📊 Export Summary:");
        println!("  Entity Type: {}", summary.entity_type);
        println!("  Rows: {}", summary.rows_exported);
        println!("  Pages: {}/{}", summary.pages_fetched, summary.total_pages);
        if let Some(bytes) = summary.payload_bytes {
            println!("  Document Size: {bytes} bytes");
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        let exit_code = if summary.interrupted {
            println!("⚠️  Export cancelled before completion.");
            130 // SIGINT exit code (standard Unix convention)
        } else if summary.is_successful() {
            println!("✅ Export completed: {}", sink.stream_path().display());
            0
        } else {
            if let Some(error) = &summary.error {
                println!("❌ Export failed: {}", error.message);
                if let Some(page) = summary.last_page_position {
                    println!("   Last successfully processed page: {page}");
                }
            }
            match summary.error.as_ref().map(|e| e.kind) {
                Some(crate::core::export::ExportErrorKind::Validation) => 2,
                _ => 1,
            }
        };

        Ok(exit_code)
    }
}
