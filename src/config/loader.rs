//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TabulaConfig;
use crate::config::secret_string;
use crate::domain::errors::TabulaError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TabulaConfig
/// 4. Applies environment variable overrides (TABULA_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use tabula::config::load_config;
///
/// let config = load_config("tabula.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TabulaConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TabulaError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TabulaError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TabulaConfig = toml::from_str(&contents)
        .map_err(|e| TabulaError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        TabulaError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static pattern");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line so placeholders in comments are left alone
    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TabulaError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the TABULA_* prefix
///
/// Environment variables follow the pattern TABULA_<SECTION>_<KEY>,
/// e.g. TABULA_PROVIDER_BASE_URL, TABULA_EXPORT_FORMAT.
fn apply_env_overrides(config: &mut TabulaConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("TABULA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Provider overrides
    if let Ok(val) = std::env::var("TABULA_PROVIDER_BASE_URL") {
        config.provider.base_url = val;
    }
    if let Ok(val) = std::env::var("TABULA_PROVIDER_USERNAME") {
        config.provider.username = Some(val);
    }
    if let Ok(val) = std::env::var("TABULA_PROVIDER_PASSWORD") {
        config.provider.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("TABULA_PROVIDER_TLS_VERIFY") {
        config.provider.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("TABULA_PROVIDER_QUERY_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.provider.query.page_size = size;
        }
    }
    if let Ok(val) = std::env::var("TABULA_PROVIDER_QUERY_MAX_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.provider.query.max_page_size = size;
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var("TABULA_EXPORT_FORMAT") {
        config.export.format = val;
    }
    if let Ok(val) = std::env::var("TABULA_EXPORT_DELIMITER") {
        config.export.delimiter = val;
    }
    if let Ok(val) = std::env::var("TABULA_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Ok(val) = std::env::var("TABULA_EXPORT_DATE_PATTERN") {
        config.export.date_pattern = val;
    }
    if let Ok(val) = std::env::var("TABULA_EXPORT_NUMBER_LOCALE") {
        if let Ok(locale) = val.parse() {
            config.export.number_locale = locale;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("TABULA_LOGGING_FILE_ENABLED") {
        config.logging.file_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("TABULA_LOGGING_FILE_PATH") {
        config.logging.file_path = val;
    }
}
