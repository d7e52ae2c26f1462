pub mod error;
pub mod flags;
pub mod io;
pub mod launch;
pub mod prestart;
pub mod telemetry;

pub mod prelude {
    pub use crate::error::CoreError;
    pub use crate::flags::{CliFlags, FlagResolver, parse_flag_tokens};
    pub use crate::io::{CloudVendorProbe, IoCharacteristicsTable, IoResolver, ResolvedIo};
    pub use crate::launch::LaunchArgs;
    pub use crate::prestart::{
        Check, CheckRegistry, Prestart, PrestartOptions, PrestartRun, Remediation,
        RemediationTable, Support, TopologyProbe, TuneError, Tuner, TunerFactory, TunerParams,
    };
    pub use crate::telemetry::{TelemetryError, TelemetrySink, send_environment};
}
