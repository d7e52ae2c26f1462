use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("install directory not found: {0}")]
    InstallDirNotFound(String),

    #[error("daemon binary not found at '{}'", .0.display())]
    BinaryNotFound(PathBuf),

    #[error("invalid launcher configuration: {0}")]
    InvalidConfig(String),

    #[error("spawn failed: {0}")]
    Spawn(String),

    #[error("launch canceled")]
    Canceled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
