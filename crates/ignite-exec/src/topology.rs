use std::time::{Duration, Instant};

use ignite_core::{error::CoreError, prestart::TopologyProbe};
use ignite_model::CpuMask;
use tracing::{debug, warn};

use crate::HostFs;

const CPU_ONLINE: &str = "/sys/devices/system/cpu/online";

/// Reads the CPU topology from sysfs.
#[derive(Debug, Clone, Default)]
pub struct SysfsTopology {
    host: HostFs,
}

impl SysfsTopology {
    pub fn new(host: HostFs) -> Self {
        Self { host }
    }

    fn online(&self) -> Result<CpuMask, CoreError> {
        let raw = self
            .host
            .read_trimmed(CPU_ONLINE)
            .map_err(|e| CoreError::Topology(format!("reading {CPU_ONLINE}: {e}")))?;
        let mask = CpuMask::parse_list(&raw)?;
        if mask.is_empty() {
            return Err(CoreError::Topology("no online CPUs".into()));
        }
        Ok(mask)
    }
}

impl TopologyProbe for SysfsTopology {
    fn all(&self, timeout: Duration) -> Result<CpuMask, CoreError> {
        let started = Instant::now();
        let mask = self.online()?;
        let elapsed = started.elapsed();
        if elapsed > timeout {
            warn!(?elapsed, ?timeout, "reading CPU topology exceeded the timeout");
        }
        debug!(cpus = mask.count(), "online CPUs");
        Ok(mask)
    }

    fn translate(&self, expr: &str) -> Result<CpuMask, CoreError> {
        let online = self.online()?;
        let expr = expr.trim();
        if expr.is_empty() || expr == "all" {
            return Ok(online);
        }

        let mask = CpuMask::parse_list(expr)?;
        if let Some(cpu) = mask.iter().find(|cpu| !online.contains(*cpu)) {
            return Err(CoreError::Topology(format!(
                "cpuset '{expr}' references offline CPU {cpu}"
            )));
        }
        Ok(mask)
    }
}
