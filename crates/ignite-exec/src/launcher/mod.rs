//! Starts the daemon with its final argument vector.
mod limits;
pub use limits::{DaemonLimits, attach_limits};

use std::{
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};

use ignite_core::launch::LaunchArgs;
use ignite_model::{Config, names};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::error::ExecError;

/// Directory below the install root holding executables.
pub const BIN_DIR: &str = "bin";

/// Spawns `<install>/bin/<binary>` and waits for it.
#[derive(Debug, Clone)]
pub struct DaemonLauncher {
    install_dir: PathBuf,
    binary: String,
    args: LaunchArgs,
    limits: DaemonLimits,
}

impl DaemonLauncher {
    /// Limits are derived from the final flags: `lock-memory=true` raises the memlock limit.
    pub fn new(install_dir: impl Into<PathBuf>, binary: impl Into<String>, args: LaunchArgs) -> Self {
        let lock_memory = args.flags.get(names::LOCK_MEMORY).is_some_and(|v| {
            v.as_bool()
                .unwrap_or_else(|| v.render().eq_ignore_ascii_case("true"))
        });
        Self {
            install_dir: install_dir.into(),
            binary: binary.into(),
            args,
            limits: DaemonLimits {
                unlimited_memlock: lock_memory,
            },
        }
    }

    pub fn limits(&self) -> DaemonLimits {
        self.limits
    }

    pub fn binary_path(&self) -> PathBuf {
        self.install_dir.join(BIN_DIR).join(&self.binary)
    }

    fn command(&self) -> Result<Command, ExecError> {
        let binary = self.binary_path();
        if !binary.is_file() {
            return Err(ExecError::BinaryNotFound(binary));
        }

        let mut cmd = Command::new(&binary);
        cmd.args(self.args.to_argv())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        attach_limits(&mut cmd, self.limits);
        Ok(cmd)
    }

    /// Run the daemon until it exits or `cancel` fires.
    ///
    /// A non-zero exit is returned as a status, not an error.
    pub async fn run(&self, cancel: CancellationToken) -> Result<ExitStatus, ExecError> {
        let mut cmd = self.command()?;
        trace!(
            binary = %self.binary_path().display(),
            argv = ?self.args.to_argv(),
            limits = ?self.limits,
            "spawning daemon",
        );

        let mut child = cmd.spawn().map_err(|e| ExecError::Spawn(e.to_string()))?;
        info!(pid = ?child.id(), "daemon started");

        tokio::select! {
            res = child.wait() => {
                let status = res?;
                debug!(%status, "daemon exited");
                Ok(status)
            }
            _ = cancel.cancelled() => {
                debug!("cancellation requested; killing daemon");
                if let Err(e) = child.kill().await {
                    debug!("failed to kill daemon: {e}");
                }
                Err(ExecError::Canceled)
            }
        }
    }
}

/// Locate the install directory.
///
/// Order: explicit flag, `node.install_directory`, then the parent of the
/// directory holding the running executable. The result must contain
/// `bin/<binary>`.
pub fn find_install_dir(flag: Option<&Path>, config: &Config) -> Result<PathBuf, ExecError> {
    let binary = config.node.binary.as_str();
    if binary.is_empty() {
        return Err(ExecError::InvalidConfig("node.binary is empty".into()));
    }

    let candidate = match flag.or(config.node.install_directory.as_deref()) {
        Some(dir) => dir.to_path_buf(),
        None => {
            let exe = std::env::current_exe()?;
            exe.parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .ok_or_else(|| {
                    ExecError::InstallDirNotFound(format!(
                        "cannot derive install directory from '{}'",
                        exe.display()
                    ))
                })?
        }
    };

    if !candidate.join(BIN_DIR).join(binary).is_file() {
        return Err(ExecError::InstallDirNotFound(format!(
            "'{}' does not contain {BIN_DIR}/{binary}",
            candidate.display()
        )));
    }
    debug!(dir = %candidate.display(), "install directory");
    Ok(candidate)
}
