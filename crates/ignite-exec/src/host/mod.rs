//! Host view over procfs and sysfs, plus the checks and tuners built on it.
mod checks;
pub use checks::{AioEventsCheck, DataDirectoryCheck, SwapCheck, register_host_checks};

mod tuners;
pub use tuners::{HostTunerFactory, SysfsTuner};
pub use tuners::{AIO_EVENTS_TUNER, SWAPPINESS_TUNER, TRANSPARENT_HUGEPAGES_TUNER};

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Resolves absolute `/proc` and `/sys` paths below a root directory.
///
/// The root is `/` on a real host; tests point it at a scratch directory.
#[derive(Debug, Clone)]
pub struct HostFs {
    root: PathBuf,
}

impl HostFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// View of the running host.
    pub fn system() -> Self {
        Self::new("/")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an absolute host path below the root.
    pub fn path(&self, abs: &str) -> PathBuf {
        self.root.join(abs.trim_start_matches('/'))
    }

    /// Read a file and trim surrounding whitespace.
    pub fn read_trimmed(&self, abs: &str) -> io::Result<String> {
        Ok(fs::read_to_string(self.path(abs))?.trim().to_string())
    }

    pub fn write(&self, abs: &str, value: &str) -> io::Result<()> {
        fs::write(self.path(abs), value)
    }
}

impl Default for HostFs {
    fn default() -> Self {
        Self::system()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted() {
        let host = HostFs::new("/tmp/root");
        assert_eq!(
            host.path("/proc/swaps"),
            PathBuf::from("/tmp/root/proc/swaps")
        );
        assert_eq!(HostFs::system().path("/proc/swaps"), PathBuf::from("/proc/swaps"));
    }

    #[test]
    fn read_trimmed_strips_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let host = HostFs::new(dir.path());
        testing::put(&host, "/proc/sys/vm/swappiness", "60\n");

        assert_eq!(host.read_trimmed("/proc/sys/vm/swappiness").unwrap(), "60");
        assert!(host.read_trimmed("/proc/missing").is_err());
    }
}
