use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("--well-known-io should have the format '<vendor>:<vm type>:<storage type>', got '{0}'")]
    InvalidWellKnownIo(String),

    #[error(
        "--well-known-io (or prestart.well_known_io) and --io-properties (or --io-properties-file) can't be set at the same time"
    )]
    IoSourceConflict,

    #[error("invalid cpuset expression: {0}")]
    InvalidCpuSet(String),

    #[error("serialization failed: {0}")]
    Serialize(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
