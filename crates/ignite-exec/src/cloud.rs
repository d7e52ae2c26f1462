use ignite_core::{error::CoreError, io::CloudVendorProbe};
use tracing::debug;

use crate::HostFs;

const DMI_FILES: [&str; 2] = ["/sys/class/dmi/id/sys_vendor", "/sys/class/dmi/id/bios_vendor"];

/// Detects the cloud vendor from SMBIOS data exposed in sysfs.
#[derive(Debug, Clone, Default)]
pub struct DmiVendorProbe {
    host: HostFs,
}

impl DmiVendorProbe {
    pub fn new(host: HostFs) -> Self {
        Self { host }
    }
}

fn vendor_of(dmi: &str) -> Option<&'static str> {
    let dmi = dmi.to_ascii_lowercase();
    if dmi.contains("amazon") {
        Some("aws")
    } else if dmi.contains("google") {
        Some("gcp")
    } else if dmi.contains("microsoft") {
        Some("azure")
    } else {
        None
    }
}

impl CloudVendorProbe for DmiVendorProbe {
    fn detect(&self) -> Result<String, CoreError> {
        for file in DMI_FILES {
            let Ok(value) = self.host.read_trimmed(file) else {
                continue;
            };
            debug!(file, value = %value, "dmi vendor");
            if let Some(vendor) = vendor_of(&value) {
                return Ok(vendor.to_string());
            }
        }
        Err(CoreError::Resolution("cloud vendor not recognised".into()))
    }
}
