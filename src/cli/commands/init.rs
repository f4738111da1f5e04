//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "tabula.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Tabula configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your record store settings", self.output);
                println!("  2. Put credentials in the environment:");
                println!("     - TABULA_PROVIDER_USERNAME / TABULA_PROVIDER_PASSWORD");
                println!("  3. Validate configuration: tabula validate-config");
                println!("  4. Run an export: tabula export --entity-type invoice \\");
                println!("       --columns '[{{\"name\":\"tranid\",\"label\":\"Invoice Number\"}}]'");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(2)
            }
        }
    }

    fn sample_config() -> &'static str {
        r#"# Tabula configuration

[application]
log_level = "info"

[provider]
# Base URL of the record store's query API
base_url = "https://records.example.com"
# Credentials may also come from TABULA_PROVIDER_USERNAME / _PASSWORD
username = "${TABULA_PROVIDER_USERNAME}"
password = "${TABULA_PROVIDER_PASSWORD}"
timeout_seconds = 60
tls_verify = true

[provider.query]
page_size = 1000
max_page_size = 1000

[export]
# "delimited" streams a text file; "workbook" renders an xlsx document
format = "delimited"
delimiter = ";"
sheet_name = "Report"
output_dir = "./exports"
date_pattern = "%d.%m.%Y"
number_locale = "european"

[logging]
file_enabled = false
file_path = "./logs"
file_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_parseable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tabula.toml");
        let args = InitArgs {
            output: path.to_str().unwrap().to_string(),
            force: false,
        };

        let code = args.execute().await.unwrap();
        assert_eq!(code, 0);
        assert!(path.exists());

        // The sample must parse once the placeholder env vars exist
        std::env::set_var("TABULA_PROVIDER_USERNAME", "exporter");
        std::env::set_var("TABULA_PROVIDER_PASSWORD", "secret");
        let config = crate::config::load_config(&path).unwrap();
        assert_eq!(config.export.format, "delimited");
        std::env::remove_var("TABULA_PROVIDER_USERNAME");
        std::env::remove_var("TABULA_PROVIDER_PASSWORD");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tabula.toml");
        std::fs::write(&path, "existing = true").unwrap();

        let args = InitArgs {
            output: path.to_str().unwrap().to_string(),
            force: false,
        };
        let code = args.execute().await.unwrap();
        assert_eq!(code, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing = true");
    }
}
