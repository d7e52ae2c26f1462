use std::path::PathBuf;

use ignite_core::{
    error::CoreError,
    prestart::{Support, TuneError, Tuner, TunerFactory, TunerParams},
};
use ignite_model::Config;
use tracing::{debug, info, trace};

use crate::HostFs;

pub const AIO_EVENTS_TUNER: &str = "aio_events";
pub const SWAPPINESS_TUNER: &str = "swappiness";
pub const TRANSPARENT_HUGEPAGES_TUNER: &str = "transparent_hugepages";

/// Tuner name, target file and value to write, in run order.
const HOST_TUNERS: [(&str, &str, &str); 3] = [
    (AIO_EVENTS_TUNER, "/proc/sys/fs/aio-max-nr", "1048576"),
    (SWAPPINESS_TUNER, "/proc/sys/vm/swappiness", "1"),
    (
        TRANSPARENT_HUGEPAGES_TUNER,
        "/sys/kernel/mm/transparent_hugepage/enabled",
        "always",
    ),
];

/// Builds the procfs/sysfs tuners of a host.
pub struct HostTunerFactory {
    host: HostFs,
}

impl HostTunerFactory {
    pub fn new(host: HostFs) -> Self {
        Self { host }
    }
}

impl TunerFactory for HostTunerFactory {
    fn available_tuners(&self) -> Vec<&'static str> {
        HOST_TUNERS.iter().map(|(name, _, _)| *name).collect()
    }

    fn is_enabled(&self, name: &str, config: &Config) -> bool {
        let prestart = &config.prestart;
        match name {
            AIO_EVENTS_TUNER => prestart.tune_aio_events,
            SWAPPINESS_TUNER => prestart.tune_swappiness,
            TRANSPARENT_HUGEPAGES_TUNER => prestart.tune_transparent_hugepages,
            _ => false,
        }
    }

    fn create(&self, name: &str, params: &TunerParams) -> Result<Box<dyn Tuner>, CoreError> {
        let (name, file, value) = HOST_TUNERS
            .iter()
            .copied()
            .find(|(n, _, _)| *n == name)
            .ok_or_else(|| CoreError::Internal(format!("unknown tuner '{name}'")))?;
        trace!(tuner = name, cpus = %params.cpu_mask, "creating tuner");
        Ok(Box::new(SysfsTuner::new(name, self.host.path(file), value)))
    }
}

/// Writes a single value into a procfs or sysfs file.
#[derive(Debug, Clone)]
pub struct SysfsTuner {
    name: &'static str,
    path: PathBuf,
    value: &'static str,
}

impl SysfsTuner {
    pub fn new(name: &'static str, path: PathBuf, value: &'static str) -> Self {
        Self { name, path, value }
    }

    /// Plain files hold the value; selector files mark it as `[value]`.
    fn is_applied(&self, current: &str) -> bool {
        let selected = format!("[{}]", self.value);
        current == self.value || current.split_whitespace().any(|t| t == selected)
    }
}

impl Tuner for SysfsTuner {
    fn name(&self) -> &str {
        self.name
    }

    fn check_if_supported(&self) -> Support {
        if self.path.exists() {
            Support::Supported
        } else {
            Support::Unsupported {
                reason: format!("'{}' does not exist", self.path.display()),
            }
        }
    }

    fn tune(&self) -> Result<(), TuneError> {
        let current = std::fs::read_to_string(&self.path)?;
        if self.is_applied(current.trim()) {
            debug!(tuner = self.name, "already tuned");
            return Ok(());
        }
        std::fs::write(&self.path, self.value)
            .map_err(|e| TuneError(format!("writing '{}': {e}", self.path.display())))?;
        info!(tuner = self.name, value = self.value, "tuned {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::put;
    use ignite_model::CpuMask;
    use std::time::Duration;

    fn params() -> TunerParams {
        TunerParams {
            cpu_mask: CpuMask::from_cpus(0..2),
            directories: Vec::new(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn tuners_follow_configuration_switches() {
        let factory = HostTunerFactory::new(HostFs::system());
        let mut config = Config::default();
        config.prestart.tune_swappiness = true;

        assert_eq!(
            factory.available_tuners(),
            vec![AIO_EVENTS_TUNER, SWAPPINESS_TUNER, TRANSPARENT_HUGEPAGES_TUNER]
        );
        assert!(!factory.is_enabled(AIO_EVENTS_TUNER, &config));
        assert!(factory.is_enabled(SWAPPINESS_TUNER, &config));
        assert!(!factory.is_enabled("unknown", &config));
    }

    #[test]
    fn unknown_tuner_cannot_be_created() {
        let factory = HostTunerFactory::new(HostFs::system());
        assert!(factory.create("cpu", &params()).is_err());
    }

    #[test]
    fn missing_target_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let factory = HostTunerFactory::new(HostFs::new(dir.path()));
        let tuner = factory.create(SWAPPINESS_TUNER, &params()).unwrap();

        assert!(matches!(
            tuner.check_if_supported(),
            Support::Unsupported { .. }
        ));
    }

    #[test]
    fn writes_value_when_not_applied() {
        let dir = tempfile::tempdir().unwrap();
        let host = HostFs::new(dir.path());
        put(&host, "/proc/sys/vm/swappiness", "60\n");

        let tuner = HostTunerFactory::new(host.clone())
            .create(SWAPPINESS_TUNER, &params())
            .unwrap();
        assert_eq!(tuner.check_if_supported(), Support::Supported);
        tuner.tune().unwrap();

        assert_eq!(host.read_trimmed("/proc/sys/vm/swappiness").unwrap(), "1");
    }

    #[test]
    fn selector_files_are_recognised() {
        let tuner = SysfsTuner::new(TRANSPARENT_HUGEPAGES_TUNER, PathBuf::new(), "always");
        assert!(tuner.is_applied("[always] madvise never"));
        assert!(!tuner.is_applied("always [madvise] never"));
    }

    #[test]
    fn tune_fails_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let tuner = SysfsTuner::new(AIO_EVENTS_TUNER, dir.path().join("nope"), "1048576");
        assert!(tuner.tune().is_err());
    }
}
