//! Discovery and loading of the persisted configuration.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use ignite_model::Config;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "ignite.yaml";
/// System-wide configuration file, also the default when none exists.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/ignite/ignite.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("reading '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Search locations used when `--config` is absent.
pub fn default_candidates() -> Vec<PathBuf> {
    vec![PathBuf::from(LOCAL_CONFIG_FILE), PathBuf::from(SYSTEM_CONFIG_FILE)]
}

/// Load the configuration named on the command line, or the first candidate
/// that exists. Without any file a default configuration is returned whose
/// `config_file` points at [`SYSTEM_CONFIG_FILE`].
pub fn load(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        return load_from(path);
    }

    match candidates.iter().find(|p| p.is_file()) {
        Some(path) => load_from(path),
        None => {
            info!("no configuration file found, using defaults");
            Ok(Config {
                config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
                ..Config::default()
            })
        }
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    // An empty file is a valid, all-default configuration.
    let mut config: Config = if raw.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };
    config.config_file = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    debug!(path = %config.config_file.display(), "configuration loaded");
    Ok(config)
}

/// Raw configuration as JSON text for telemetry.
///
/// The file is re-read so keys unknown to this build are kept; when that is
/// not possible the in-memory configuration is serialized instead.
pub fn raw_json(config: &Config) -> String {
    match file_as_json(&config.config_file) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "couldn't read raw configuration, sending the loaded one");
            serde_json::to_string(config).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

fn file_as_json(path: &Path) -> Result<String, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let value: serde_yaml::Value = serde_yaml::from_str(&raw).map_err(|e| e.to_string())?;
    serde_json::to_string(&value).map_err(|e| e.to_string())
}
