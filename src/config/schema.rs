//! Configuration schema types
//!
//! This module defines the configuration structure mapped from the TOML
//! file. Each section validates itself; [`TabulaConfig::validate`] runs all
//! of them before any job is created.

use crate::config::SecretString;
use crate::core::format::NumberLocale;
use serde::{Deserialize, Serialize};

/// Main Tabula configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabulaConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Record-store provider configuration
    pub provider: ProviderConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TabulaConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.provider.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Record-store provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the record store's query API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Username for Basic authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for Basic authentication (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Pagination settings
    #[serde(default)]
    pub query: QueryConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            query: QueryConfig::default(),
        }
    }
}

impl ProviderConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("provider.base_url cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("provider.timeout_seconds must be positive".to_string());
        }
        self.query.validate()
    }
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Records per page during retrieval
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Largest page size a job may request; mirrors the store's ceiling
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl QueryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.page_size == 0 {
            return Err("provider.query.page_size must be positive".to_string());
        }
        if self.max_page_size == 0 {
            return Err("provider.query.max_page_size must be positive".to_string());
        }
        if self.page_size > self.max_page_size {
            return Err(format!(
                "provider.query.page_size ({}) exceeds max_page_size ({})",
                self.page_size, self.max_page_size
            ));
        }
        Ok(())
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format: "delimited" or "workbook"
    #[serde(default = "default_format")]
    pub format: String,

    /// Field separator for delimited output
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Sheet name for workbook output
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Directory export documents are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Date pattern applied to every date cell
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,

    /// Number locale applied to every number cell
    #[serde(default)]
    pub number_locale: NumberLocale,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            delimiter: default_delimiter(),
            sheet_name: default_sheet_name(),
            output_dir: default_output_dir(),
            date_pattern: default_date_pattern(),
            number_locale: NumberLocale::default(),
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if !["delimited", "workbook"].contains(&self.format.as_str()) {
            return Err(format!(
                "Invalid export.format '{}'. Must be one of: delimited, workbook",
                self.format
            ));
        }
        if self.delimiter.chars().count() != 1 {
            return Err(format!(
                "export.delimiter must be a single character, got '{}'",
                self.delimiter
            ));
        }
        if self.sheet_name.trim().is_empty() {
            return Err("export.sheet_name cannot be empty".to_string());
        }
        if self.date_pattern.trim().is_empty() {
            return Err("export.date_pattern cannot be empty".to_string());
        }
        Ok(())
    }

    /// The configured delimiter as a char
    pub fn delimiter_char(&self) -> char {
        self.delimiter.chars().next().unwrap_or(';')
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable rolling file logging
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub file_path: String,

    /// Rotation: "daily" or "hourly"
    #[serde(default = "default_rotation")]
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_enabled: false,
            file_path: default_log_path(),
            file_rotation: default_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.file_enabled && self.file_path.trim().is_empty() {
            return Err("logging.file_path cannot be empty when file logging is enabled".to_string());
        }
        if !["daily", "hourly"].contains(&self.file_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.file_rotation '{}'. Must be one of: daily, hourly",
                self.file_rotation
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    1000
}

fn default_max_page_size() -> usize {
    1000
}

fn default_format() -> String {
    "delimited".to_string()
}

fn default_delimiter() -> String {
    ";".to_string()
}

fn default_sheet_name() -> String {
    "Report".to_string()
}

fn default_output_dir() -> String {
    "./exports".to_string()
}

fn default_date_pattern() -> String {
    "%d.%m.%Y".to_string()
}

fn default_log_path() -> String {
    "./logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}
