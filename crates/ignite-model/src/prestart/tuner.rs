use serde::{Deserialize, Serialize};

/// Outcome of a single tuner in one prestart run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunerResult {
    pub name: String,
    pub enabled: bool,
    pub supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TunerResult {
    /// Tuner turned off by configuration; it was never created or invoked,
    /// so its support on this host is not known.
    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: false,
            supported: false,
            error: None,
        }
    }

    /// Tuner enabled but not applicable on this host.
    pub fn unsupported(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            supported: false,
            error: None,
        }
    }

    pub fn succeeded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            supported: true,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            supported: true,
            error: Some(error.into()),
        }
    }
}
