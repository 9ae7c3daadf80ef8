//! # Application Configuration
//!
//! This module defines the configuration structure for the `consulta-server` and
//! provides the logic for loading it from an optional `config.yml` file and
//! environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::{info, warn};

/// Secret used when `JWT_SECRET` is not configured. Fine for local development only.
pub const DEV_JWT_SECRET: &str = "consulta-dev-secret";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// The HMAC secret used to sign bearer tokens. Loaded from `JWT_SECRET`.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in seconds. Loaded from `TOKEN_TTL_SECS`.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Directory where uploaded files are written. Loaded from `UPLOADS_DIR`.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Maximum accepted request body on the upload route. Loaded from `MAX_UPLOAD_BYTES`.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_port() -> u16 {
    3001
}
fn default_db_url() -> String {
    consulta::constants::DEFAULT_DB_FILE.to_string()
}
fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}
fn default_token_ttl_secs() -> u64 {
    core_access::DEFAULT_TOKEN_TTL_SECS
}
fn default_uploads_dir() -> String {
    consulta::constants::DEFAULT_UPLOADS_DIR.to_string()
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

// Reads a file and substitutes `${VAR}` references with environment values.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration.
///
/// Layers, lowest precedence first:
/// - built-in defaults
/// - `config.yml` next to the server manifest, or the file at `config_path_override`
/// - plain environment variables (`PORT`, `DB_URL`, `JWT_SECRET`, ...)
/// - `CONSULTA_`-prefixed environment variables (e.g. `CONSULTA_PORT`)
///
/// The default file is optional. An explicit override path must exist.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let file_content = match config_path_override {
        Some(path) => Some(read_and_substitute(path)?.ok_or_else(|| {
            ConfigError::NotFound(format!("Config file not found at '{path}'."))
        })?),
        None => {
            let default_path = format!("{}/config.yml", env!("CARGO_MANIFEST_DIR"));
            let content = read_and_substitute(&default_path)?;
            if content.is_some() {
                info!("Loading configuration from '{default_path}'.");
            }
            content
        }
    };
    if let Some(content) = file_content {
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(Environment::default().try_parsing(true))
        .add_source(
            Environment::with_prefix("CONSULTA")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;

    if config.jwt_secret == DEV_JWT_SECRET {
        warn!("JWT_SECRET is not set; tokens are signed with the development secret.");
    }

    Ok(config)
}
