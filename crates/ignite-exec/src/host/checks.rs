use std::{fs, path::Path, time::Duration};

use ignite_core::prestart::{Check, CheckRegistry};
use ignite_model::{CheckResult, CheckerId, Config, Severity};

use crate::HostFs;

const SWAPS: &str = "/proc/swaps";
const AIO_MAX_NR: &str = "/proc/sys/fs/aio-max-nr";

/// Minimum `fs.aio-max-nr` the daemon needs for its I/O queues.
pub const MIN_AIO_EVENTS: u64 = 1_048_576;

/// Register the built-in host checks in their run order.
pub fn register_host_checks(registry: &mut CheckRegistry, host: &HostFs) {
    registry.register(Box::new(DataDirectoryCheck));
    registry.register(Box::new(SwapCheck::new(host.clone())));
    registry.register(Box::new(AioEventsCheck::new(host.clone())));
}

/// The data directory must exist and be writable.
pub struct DataDirectoryCheck;

impl Check for DataDirectoryCheck {
    fn id(&self) -> CheckerId {
        CheckerId::DATA_DIRECTORY
    }

    fn run(&self, config: &Config, _timeout: Duration) -> CheckResult {
        let dir = &config.node.data_directory;
        let result = CheckResult::new(self.id(), "Data directory is writable", Severity::Fatal)
            .required(true);
        match probe_writable(dir) {
            Ok(()) => result.current(true).ok(true),
            Err(e) => result
                .current(false)
                .with_error(format!("{}: {e}", dir.display())),
        }
    }
}

fn probe_writable(dir: &Path) -> std::io::Result<()> {
    let probe = dir.join(".ignite-write-probe");
    fs::write(&probe, b"")?;
    fs::remove_file(&probe)
}

/// Swap should be disabled; memory locking is dropped when it is not.
pub struct SwapCheck {
    host: HostFs,
}

impl SwapCheck {
    pub fn new(host: HostFs) -> Self {
        Self { host }
    }
}

impl Check for SwapCheck {
    fn id(&self) -> CheckerId {
        CheckerId::SWAP
    }

    fn run(&self, _config: &Config, _timeout: Duration) -> CheckResult {
        let result =
            CheckResult::new(self.id(), "Swap disabled", Severity::Warning).required(true);
        match self.host.read_trimmed(SWAPS) {
            // First line is the column header.
            Ok(swaps) => {
                let disabled = swaps.lines().skip(1).all(|l| l.trim().is_empty());
                result.current(disabled).ok(disabled)
            }
            Err(e) => result.current("unknown").with_error(e),
        }
    }
}

/// `fs.aio-max-nr` must allow enough in-flight asynchronous I/O events.
pub struct AioEventsCheck {
    host: HostFs,
}

impl AioEventsCheck {
    pub fn new(host: HostFs) -> Self {
        Self { host }
    }
}

impl Check for AioEventsCheck {
    fn id(&self) -> CheckerId {
        CheckerId::AIO_EVENTS
    }

    fn run(&self, _config: &Config, _timeout: Duration) -> CheckResult {
        let result = CheckResult::new(self.id(), "Max AIO Events", Severity::Warning)
            .required(format!(">= {MIN_AIO_EVENTS}"));
        match self.host.read_trimmed(AIO_MAX_NR) {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(n) => result.current(n).ok(n >= MIN_AIO_EVENTS),
                Err(e) => result.current(raw).with_error(e),
            },
            Err(e) => result.current("unknown").with_error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::put;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn registers_checks_in_order() {
        let mut registry = CheckRegistry::new();
        register_host_checks(&mut registry, &HostFs::system());

        let ids: Vec<CheckerId> = registry.iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            vec![CheckerId::DATA_DIRECTORY, CheckerId::SWAP, CheckerId::AIO_EVENTS]
        );
    }

    #[test]
    fn data_directory_must_exist_and_be_writable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();

        config.node.data_directory = dir.path().to_path_buf();
        let ok = DataDirectoryCheck.run(&config, TIMEOUT);
        assert!(ok.ok);
        assert_eq!(ok.severity, Severity::Fatal);
        assert!(!dir.path().join(".ignite-write-probe").exists());

        config.node.data_directory = dir.path().join("missing");
        let missing = DataDirectoryCheck.run(&config, TIMEOUT);
        assert!(!missing.ok);
        assert_eq!(missing.current, "false");
        assert!(missing.error.is_some());
    }

    #[test]
    fn swap_check_reads_proc_swaps() {
        let dir = tempfile::tempdir().unwrap();
        let host = HostFs::new(dir.path());
        let check = SwapCheck::new(host.clone());

        put(&host, SWAPS, "Filename\tType\tSize\tUsed\tPriority\n");
        let r = check.run(&Config::default(), TIMEOUT);
        assert!(r.ok);
        assert_eq!(r.current, "true");

        put(
            &host,
            SWAPS,
            "Filename\tType\tSize\tUsed\tPriority\n/swapfile file 2097148 0 -2\n",
        );
        let r = check.run(&Config::default(), TIMEOUT);
        assert!(!r.ok);
        assert_eq!(r.checker, CheckerId::SWAP);
        assert_eq!(r.severity, Severity::Warning);
    }

    #[test]
    fn swap_check_reports_read_errors() {
        let dir = tempfile::tempdir().unwrap();
        let r = SwapCheck::new(HostFs::new(dir.path())).run(&Config::default(), TIMEOUT);
        assert!(!r.ok);
        assert!(r.error.is_some());
    }

    #[test]
    fn aio_events_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let host = HostFs::new(dir.path());
        let check = AioEventsCheck::new(host.clone());

        put(&host, AIO_MAX_NR, "65536\n");
        let low = check.run(&Config::default(), TIMEOUT);
        assert!(!low.ok);
        assert_eq!(low.current, "65536");
        assert_eq!(low.required, ">= 1048576");

        put(&host, AIO_MAX_NR, "1048576\n");
        assert!(check.run(&Config::default(), TIMEOUT).ok);

        put(&host, AIO_MAX_NR, "lots\n");
        let bad = check.run(&Config::default(), TIMEOUT);
        assert!(!bad.ok);
        assert!(bad.error.is_some());
    }
}
