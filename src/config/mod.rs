//! Configuration management
//!
//! TOML configuration with `${VAR}` environment substitution, `TABULA_*`
//! environment overrides and per-section validation.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExportConfig, LoggingConfig, ProviderConfig, QueryConfig, TabulaConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
