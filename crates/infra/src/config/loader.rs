//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the credentials are not set there, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `EMPORIA_USERNAME`: Account e-mail (required)
//! - `EMPORIA_PASSWORD`: Account password (required)
//! - `EMPORIA_USER_POOL_ID`, `EMPORIA_CLIENT_ID`, `EMPORIA_REGION`: Identity pool
//! - `EMPORIA_CLIENT_SECRET`: App client secret, when the client has one
//! - `EMPORIA_COGNITO_ENDPOINT`: Identity endpoint override
//! - `EMPORIA_HYDRO_RATE_LOW`, `EMPORIA_HYDRO_RATE_HIGH`,
//!   `EMPORIA_HYDRO_RATE_GENERAC`: Tariff rates in cents/kWh
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./emporia.json` or `./emporia.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use emporia_domain::{Config, EmporiaError, Result};

const FILE_NAMES: [&str; 4] = ["config.json", "config.toml", "emporia.json", "emporia.toml"];
const PARENT_FILE_NAMES: [&str; 4] =
    ["../config.json", "../config.toml", "../../config.json", "../../config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the credentials
/// are missing there, falls back to loading from a config file.
///
/// # Errors
/// Returns `EmporiaError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only the credentials are required; every other key falls back to the
/// defaults of [`Config::new`].
///
/// # Errors
/// Returns `EmporiaError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::new(env_var("EMPORIA_USERNAME")?, env_var("EMPORIA_PASSWORD")?);

    if let Some(pool) = env_opt("EMPORIA_USER_POOL_ID") {
        config.user_pool_id = pool;
    }
    if let Some(client_id) = env_opt("EMPORIA_CLIENT_ID") {
        config.client_id = client_id;
    }
    if let Some(region) = env_opt("EMPORIA_REGION") {
        config.region = region;
    }
    config.client_secret = env_opt("EMPORIA_CLIENT_SECRET");
    config.cognito_endpoint = env_opt("EMPORIA_COGNITO_ENDPOINT");

    config.hydro_rate_low = env_rate("EMPORIA_HYDRO_RATE_LOW")?;
    config.hydro_rate_high = env_rate("EMPORIA_HYDRO_RATE_HIGH")?;
    config.hydro_rate_generac = env_rate("EMPORIA_HYDRO_RATE_GENERAC")?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `EmporiaError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(EmporiaError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            EmporiaError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| EmporiaError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| EmporiaError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| EmporiaError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(EmporiaError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its two parents and the
/// executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    FILE_NAMES.iter().chain(PARENT_FILE_NAMES.iter()).map(move |name| dir.join(name))
}

/// Get required environment variable
///
/// # Errors
/// Returns `EmporiaError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        EmporiaError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; empty values count as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_rate(key: &str) -> Result<Option<f64>> {
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|e| EmporiaError::Config(format!("Invalid rate in {}: {}", key, e)))
        })
        .transpose()
}
