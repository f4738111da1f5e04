//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Tabula configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after parsing, so reaching Ok means both
        // steps passed
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Record Store: {}", config.provider.base_url);
        println!(
            "  Authentication: {}",
            if config.provider.username.is_some() {
                "basic"
            } else {
                "none"
            }
        );
        println!("  Page Size: {}", config.provider.query.page_size);
        println!("  Max Page Size: {}", config.provider.query.max_page_size);
        println!("  Output Format: {}", config.export.format);
        println!("  Output Directory: {}", config.export.output_dir);

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_missing_file_returns_config_error() {
        let args = ValidateArgs {};
        let code = args.execute("definitely-missing.toml").await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_valid_file_returns_zero() {
        let toml_content = r#"
[provider]
base_url = "https://records.example.com"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let args = ValidateArgs {};
        let code = args
            .execute(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
