//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Optional TOML file with the full configuration.
pub const CONFIG_PATH_VAR: &str = "GATEWAY_CONFIG";
/// Deployment profile (`metrics` or `basic`).
pub const PROFILE_VAR: &str = "GATEWAY_PROFILE";
/// Bind address override.
pub const LISTEN_VAR: &str = "GATEWAY_LISTEN";
/// External base URL whose host replaces the inbound Host header.
pub const BASE_URL_VAR: &str = "BASE_URL";
pub const TARGET_WEB_VAR: &str = "TARGET_WEB";
pub const TARGET_API_VAR: &str = "TARGET_API";
pub const TARGET_AUTH_VAR: &str = "TARGET_AUTH";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{var}: {message}")]
    Env { var: &'static str, message: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load configuration from the process environment.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

/// Build the configuration in layers: profile defaults, then the optional
/// file named by `GATEWAY_CONFIG`, then individual environment overrides.
///
/// Variables that are unset or empty are ignored.
pub fn load_with<F>(lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let mut config = match var(CONFIG_PATH_VAR) {
        Some(path) => read_file(Path::new(&path))?,
        None => GatewayConfig::default(),
    };

    if let Some(profile) = var(PROFILE_VAR) {
        config.profile = profile.parse().map_err(|message| ConfigError::Env {
            var: PROFILE_VAR,
            message,
        })?;
    }
    if let Some(address) = var(LISTEN_VAR) {
        config.listener.bind_address = Some(address);
    }
    if let Some(base_url) = var(BASE_URL_VAR) {
        config.base_url = Some(base_url);
    }
    if let Some(web) = var(TARGET_WEB_VAR) {
        config.targets.web = web;
    }
    if let Some(api) = var(TARGET_API_VAR) {
        config.targets.api = api;
    }
    if let Some(auth) = var(TARGET_AUTH_VAR) {
        config.targets.auth = auth;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}
