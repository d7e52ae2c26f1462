mod check;
pub use check::{CheckResult, CheckerId, Severity};

mod tuner;
pub use tuner::TunerResult;

mod report;
pub use report::{EnvironmentPayload, PrestartReport};
