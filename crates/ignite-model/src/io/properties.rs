use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Throughput and latency characteristics of one storage configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoCharacteristics {
    pub read_iops: u64,
    pub read_bandwidth: u64,
    pub write_iops: u64,
    pub write_bandwidth: u64,
}

/// I/O description of a single mount point, in the daemon's `io-properties` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoProperties {
    pub mountpoint: PathBuf,
    #[serde(flatten)]
    pub characteristics: IoCharacteristics,
}

#[derive(Serialize)]
struct Disks<'a> {
    disks: [&'a IoProperties; 1],
}

impl IoProperties {
    pub fn new(mountpoint: impl AsRef<Path>, characteristics: IoCharacteristics) -> Self {
        Self {
            mountpoint: mountpoint.as_ref().to_path_buf(),
            characteristics,
        }
    }

    /// Serialize as the YAML document passed through `--io-properties`.
    pub fn to_yaml(&self) -> Result<String, ModelError> {
        serde_yaml::to_string(&Disks { disks: [self] })
            .map_err(|e| ModelError::Serialize(e.to_string()))
    }
}
