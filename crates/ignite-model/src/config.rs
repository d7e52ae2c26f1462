use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Persisted configuration consumed by the prestart sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File the configuration was loaded from (or would be written to).
    #[serde(skip)]
    pub config_file: PathBuf,
    pub node: NodeConfig,
    pub prestart: PrestartConfig,
}

/// Where the daemon is installed and where it keeps its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub data_directory: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_directory: Option<PathBuf>,
    /// Executable name below `<install_directory>/bin`.
    pub binary: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("/var/lib/ignite/data"),
            install_directory: None,
            binary: "daemon".to_string(),
        }
    }
}

/// Prestart and launch settings.
///
/// Optional values are derived into launch flags only when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestartConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overprovisioned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_memory_locking: Option<bool>,
    /// Desired CPU count; zero means "not set".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smp: Option<u32>,
    /// `<vendor>:<vm type>:<storage type>`; empty means "detect".
    pub well_known_io: String,
    /// Free-form daemon flags with the lowest precedence.
    pub additional_start_flags: Vec<String>,
    pub tune_aio_events: bool,
    pub tune_swappiness: bool,
    pub tune_transparent_hugepages: bool,
    pub enable_usage_stats: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry_file: Option<PathBuf>,
}

impl PrestartConfig {
    /// Desired CPU count, ignoring the zero placeholder.
    pub fn smp(&self) -> Option<u32> {
        self.smp.filter(|n| *n != 0)
    }

    /// Tokens of [`PrestartConfig::additional_start_flags`], split on whitespace.
    pub fn additional_start_tokens(&self) -> Vec<String> {
        self.additional_start_flags
            .iter()
            .flat_map(|s| s.split_whitespace())
            .map(str::to_string)
            .collect()
    }
}
