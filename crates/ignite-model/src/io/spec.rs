use std::{fmt, path::PathBuf, str::FromStr};

use crate::ModelError;

/// Vendor, VM type and storage type identifying pre-measured I/O characteristics.
///
/// Written as `<vendor>:<vm type>:<storage type>`, e.g. `aws:i3.xlarge:nvme`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownIo {
    pub vendor: String,
    pub vm_type: String,
    pub storage: String,
}

impl FromStr for WellKnownIo {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(':').collect();
        match tokens.as_slice() {
            [vendor, vm_type, storage] => Ok(Self {
                vendor: vendor.to_string(),
                vm_type: vm_type.to_string(),
                storage: storage.to_string(),
            }),
            _ => Err(ModelError::InvalidWellKnownIo(s.to_string())),
        }
    }
}

impl fmt::Display for WellKnownIo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.vendor, self.vm_type, self.storage)
    }
}

/// Where the daemon's I/O subsystem description comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoPropertiesSpec {
    /// Path to a YAML file describing the I/O subsystem.
    File(PathBuf),
    /// Inline YAML description.
    Inline(String),
    /// Look up pre-measured characteristics for a vendor/VM/storage triple.
    WellKnown(WellKnownIo),
    /// Detect the cloud vendor and use its default characteristics.
    Auto,
}

impl IoPropertiesSpec {
    /// Build the spec from the explicitly provided sources.
    ///
    /// An explicit description (file or inline) and a well-known identifier are
    /// mutually exclusive. A non-empty identifier must have exactly three tokens.
    pub fn from_sources(
        file: Option<PathBuf>,
        inline: Option<String>,
        well_known: Option<&str>,
    ) -> Result<Self, ModelError> {
        let well_known = well_known.filter(|s| !s.is_empty());
        if (file.is_some() || inline.is_some()) && well_known.is_some() {
            return Err(ModelError::IoSourceConflict);
        }
        if let Some(file) = file {
            return Ok(Self::File(file));
        }
        if let Some(inline) = inline {
            return Ok(Self::Inline(inline));
        }
        match well_known {
            Some(id) => Ok(Self::WellKnown(id.parse()?)),
            None => Ok(Self::Auto),
        }
    }

    /// Returns `true` for an explicit file or inline description.
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::File(_) | Self::Inline(_))
    }
}
