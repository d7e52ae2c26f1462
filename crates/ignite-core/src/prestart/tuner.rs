use std::{path::PathBuf, time::Duration};

use ignite_model::{Config, CpuMask};
use thiserror::Error;

use crate::error::CoreError;

/// Error returned by a tuner that could not apply its adjustment.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TuneError(pub String);

impl From<std::io::Error> for TuneError {
    fn from(e: std::io::Error) -> Self {
        TuneError(e.to_string())
    }
}

/// Whether a tuner can run on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Support {
    Supported,
    Unsupported { reason: String },
}

/// Applies one OS or hardware level adjustment.
pub trait Tuner {
    fn name(&self) -> &str;

    fn check_if_supported(&self) -> Support;

    fn tune(&self) -> Result<(), TuneError>;
}

/// Parameters shared by every tuner in one run.
#[derive(Debug, Clone)]
pub struct TunerParams {
    /// CPUs the daemon will run on.
    pub cpu_mask: CpuMask,
    /// Directories the daemon writes to.
    pub directories: Vec<PathBuf>,
    /// Upper bound for blocking operations inside tuners.
    pub timeout: Duration,
}

/// Builds tuners by name.
pub trait TunerFactory {
    /// Tuner names, in the order they must run.
    fn available_tuners(&self) -> Vec<&'static str>;

    fn is_enabled(&self, name: &str, config: &Config) -> bool;

    fn create(&self, name: &str, params: &TunerParams) -> Result<Box<dyn Tuner>, CoreError>;
}

/// Translates CPU set expressions into masks.
pub trait TopologyProbe {
    /// Every CPU available on the host.
    fn all(&self, timeout: Duration) -> Result<CpuMask, CoreError>;

    /// Translate a cpuset(7) list expression.
    fn translate(&self, expr: &str) -> Result<CpuMask, CoreError>;
}
