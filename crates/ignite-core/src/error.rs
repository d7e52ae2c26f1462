use thiserror::Error;

use ignite_model::ModelError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration conflict: {0}")]
    ConfigurationConflict(String),

    #[error("System check '{desc}' failed. Required: {required}, Current: {current}")]
    CheckFailed {
        desc: String,
        required: String,
        current: String,
    },

    #[error("tuner '{name}' failed: {reason}")]
    TunerFailed { name: String, reason: String },

    #[error("cpu topology error: {0}")]
    Topology(String),

    #[error("resolution failed: {0}")]
    Resolution(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ModelError> for CoreError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidWellKnownIo(_) | ModelError::IoSourceConflict => {
                CoreError::ConfigurationConflict(e.to_string())
            }
            ModelError::InvalidCpuSet(_) => CoreError::Topology(e.to_string()),
            ModelError::Serialize(_) => CoreError::Internal(e.to_string()),
        }
    }
}
