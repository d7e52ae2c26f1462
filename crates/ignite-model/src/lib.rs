mod domain;
pub use domain::names;
pub use domain::{CpuMask, FlagMap, FlagValue, MAX_CPUS};

mod error;
pub use error::{ModelError, ModelResult};

mod io;
pub use io::{IoCharacteristics, IoProperties, IoPropertiesSpec, WellKnownIo};

mod prestart;
pub use prestart::{
    CheckResult, CheckerId, EnvironmentPayload, PrestartReport, Severity, TunerResult,
};

mod config;
pub use config::{Config, NodeConfig, PrestartConfig};
