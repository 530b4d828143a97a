//! TOML config file loading.

use crate::schema::ImConfig;
use crate::validation;
use imnotify_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Parse and validate config from a TOML string.
pub fn parse_str(content: &str) -> Result<ImConfig, ConfigError> {
    let config: ImConfig = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from a specific TOML file path.
///
/// Missing fields take their defaults. Unlike a cosmetic config, an invalid
/// reconnect or schedule setting is an error rather than a silent fallback.
pub fn load_from_path(path: &Path) -> Result<ImConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
    })?;

    let config = parse_str(&content)?;
    info!(
        accounts = config.accounts.len(),
        "loaded config from {}",
        path.display()
    );
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// A missing file is not an error: defaults (with no accounts) are returned.
pub fn load_default() -> Result<ImConfig, ConfigError> {
    let path = default_config_path()?;
    if !path.exists() {
        info!("no config found at {}, using defaults", path.display());
        return Ok(ImConfig::default());
    }
    load_from_path(&path)
}

/// Get the platform-specific default config file path.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        ConfigError::ParseError("could not determine config directory".into())
    })?;
    Ok(config_dir.join("imnotify").join("config.toml"))
}
