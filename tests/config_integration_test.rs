//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with
//! --test-threads=1 to avoid interference between tests.

use std::io::Write;
use std::sync::Mutex;
use tabula::config::load_config;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("TABULA_APPLICATION_LOG_LEVEL");
    std::env::remove_var("TABULA_PROVIDER_BASE_URL");
    std::env::remove_var("TABULA_PROVIDER_QUERY_PAGE_SIZE");
    std::env::remove_var("TABULA_EXPORT_FORMAT");
    std::env::remove_var("TABULA_EXPORT_NUMBER_LOCALE");
    std::env::remove_var("TEST_PROVIDER_PASSWORD");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[provider]
base_url = "https://records.example.com/api"
username = "exporter"
password = "secret"
timeout_seconds = 30
tls_verify = true

[provider.query]
page_size = 500
max_page_size = 1000

[export]
format = "workbook"
delimiter = ";"
sheet_name = "Invoices"
output_dir = "/tmp/exports"
date_pattern = "%d/%m/%Y"
number_locale = "plain"

[logging]
file_enabled = false
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.provider.base_url, "https://records.example.com/api");
    assert_eq!(config.provider.timeout_seconds, 30);
    assert_eq!(config.provider.query.page_size, 500);
    assert_eq!(config.export.format, "workbook");
    assert_eq!(config.export.sheet_name, "Invoices");
    assert_eq!(config.export.date_pattern, "%d/%m/%Y");
}

#[test]
fn test_minimal_config_gets_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[provider]
base_url = "https://records.example.com"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.provider.query.page_size, 1000);
    assert_eq!(config.provider.query.max_page_size, 1000);
    assert_eq!(config.export.format, "delimited");
    assert_eq!(config.export.delimiter, ";");
    assert_eq!(config.export.date_pattern, "%d.%m.%Y");
    assert!(!config.logging.file_enabled);
}

#[test]
fn test_env_var_substitution_in_credentials() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_PROVIDER_PASSWORD", "from-env");

    let file = write_config(
        r#"
[provider]
base_url = "https://records.example.com"
username = "exporter"
password = "${TEST_PROVIDER_PASSWORD}"
"#,
    );

    let config = load_config(file.path()).unwrap();
    use secrecy::ExposeSecret;
    assert_eq!(
        config.provider.password.as_ref().unwrap().expose_secret().as_ref(),
        "from-env"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_configuration_error() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[provider]
base_url = "https://records.example.com"
password = "${TABULA_DEFINITELY_UNSET_VAR}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TABULA_DEFINITELY_UNSET_VAR"));
}

#[test]
fn test_env_overrides_take_precedence() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TABULA_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("TABULA_PROVIDER_QUERY_PAGE_SIZE", "250");

    let file = write_config(
        r#"
[application]
log_level = "info"

[provider]
base_url = "https://records.example.com"

[provider.query]
page_size = 1000
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.provider.query.page_size, 250);

    cleanup_env_vars();
}

#[test]
fn test_invalid_config_rejected_with_section_in_message() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[provider]
base_url = "https://records.example.com"

[export]
delimiter = "abc"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("delimiter"));
}
