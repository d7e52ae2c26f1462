//! I/O Properties Resolver.
//!
//! Decides where the daemon's I/O subsystem description comes from: an
//! explicit file or inline description, the per-install default file, a
//! well-known vendor/VM/storage identifier, or live cloud vendor detection.
use std::path::{Path, PathBuf};

use ignite_model::{
    Config, IoCharacteristics, IoProperties, IoPropertiesSpec, WellKnownIo, names,
};
use tracing::{debug, info, warn};

use crate::{error::CoreError, flags::CliFlags};

/// File name of the I/O description looked up next to the configuration file.
pub const DEFAULT_IO_CONFIG_FILE: &str = "io-config.yaml";

/// Detects the cloud vendor of the current host.
pub trait CloudVendorProbe {
    /// Returns the vendor identifier (e.g. `aws`, `gcp`).
    fn detect(&self) -> Result<String, CoreError>;
}

/// Pre-measured I/O characteristics per vendor and VM type.
pub trait IoCharacteristicsTable {
    /// Characteristics of an exact vendor/VM/storage triple.
    fn lookup(&self, id: &WellKnownIo) -> Option<IoCharacteristics>;

    /// Default characteristics for a vendor, without VM or storage granularity.
    fn vendor_default(&self, vendor: &str) -> Option<IoCharacteristics>;
}

/// Characteristics found for this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoDescriptor {
    pub vendor: String,
    /// `None` when only vendor defaults were used.
    pub vm_type: Option<String>,
    pub storage: Option<String>,
    pub properties: IoProperties,
}

/// Outcome of I/O resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIo {
    /// The user passed an explicit description; nothing to resolve.
    Explicit,
    /// An I/O description exists at the per-install default location.
    DefaultFile(PathBuf),
    /// Characteristics were found in the table.
    Lookup(IoDescriptor),
    /// Nothing applies; the daemon starts without I/O properties.
    Unavailable,
}

pub struct IoResolver<'a> {
    vendor: &'a dyn CloudVendorProbe,
    table: &'a dyn IoCharacteristicsTable,
}

impl<'a> IoResolver<'a> {
    pub fn new(vendor: &'a dyn CloudVendorProbe, table: &'a dyn IoCharacteristicsTable) -> Self {
        Self { vendor, table }
    }

    /// Resolve the I/O description for this launch.
    ///
    /// Conflicting or malformed settings are returned as
    /// [`CoreError::ConfigurationConflict`]. Detection and lookup failures are
    /// logged and reported as [`ResolvedIo::Unavailable`].
    pub fn resolve(&self, config: &Config, cli: &CliFlags) -> Result<ResolvedIo, CoreError> {
        let file = cli
            .explicit_value(names::IO_PROPERTIES_FILE)
            .map(|v| PathBuf::from(v.render()));
        let inline = cli.explicit_value(names::IO_PROPERTIES).map(|v| v.render());
        let well_known = cli
            .well_known_io()
            .or(Some(config.prestart.well_known_io.as_str()));

        let spec = IoPropertiesSpec::from_sources(file, inline, well_known)?;
        if spec.is_explicit() {
            debug!("explicit I/O properties given, skipping resolution");
            return Ok(ResolvedIo::Explicit);
        }

        if let Some(path) = default_io_config_path(&config.config_file) {
            if path.exists() {
                debug!(path = %path.display(), "found I/O properties at the default location");
                return Ok(ResolvedIo::DefaultFile(path));
            }
        }

        let mountpoint = &config.node.data_directory;
        let resolved = match spec {
            IoPropertiesSpec::WellKnown(id) => self.lookup_well_known(&id, mountpoint),
            _ => self.detect_vendor(mountpoint),
        };
        match resolved {
            Ok(desc) => Ok(ResolvedIo::Lookup(desc)),
            Err(e) => {
                warn!(error = %e, "no I/O properties resolved");
                Ok(ResolvedIo::Unavailable)
            }
        }
    }

    fn lookup_well_known(&self, id: &WellKnownIo, mountpoint: &Path) -> Result<IoDescriptor, CoreError> {
        let ch = self.table.lookup(id).ok_or_else(|| {
            CoreError::Resolution(format!("no I/O data found for '{id}'"))
        })?;
        Ok(IoDescriptor {
            vendor: id.vendor.clone(),
            vm_type: Some(id.vm_type.clone()),
            storage: Some(id.storage.clone()),
            properties: IoProperties::new(mountpoint, ch),
        })
    }

    fn detect_vendor(&self, mountpoint: &Path) -> Result<IoDescriptor, CoreError> {
        info!("Detecting the current cloud vendor and VM");
        let vendor = self.vendor.detect().map_err(|e| {
            CoreError::Resolution(format!("could not detect the current cloud vendor: {e}"))
        })?;
        let ch = self.table.vendor_default(&vendor).ok_or_else(|| {
            CoreError::Resolution(format!("no I/O data found for vendor '{vendor}'"))
        })?;
        info!(vendor = %vendor, "using default I/O properties for cloud vendor");
        Ok(IoDescriptor {
            vendor,
            vm_type: None,
            storage: None,
            properties: IoProperties::new(mountpoint, ch),
        })
    }
}

/// Location of the per-install I/O description, next to the configuration file.
pub fn default_io_config_path(config_file: &Path) -> Option<PathBuf> {
    config_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(DEFAULT_IO_CONFIG_FILE))
}
