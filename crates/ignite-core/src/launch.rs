use std::path::PathBuf;

use ignite_model::FlagMap;

/// Argument the daemon reads its configuration file path from.
pub const CONFIG_FILE_ARG: &str = "--config";

/// Final arguments handed to the process launcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    pub config_file: PathBuf,
    pub flags: FlagMap,
    /// Positional arguments passed through verbatim.
    pub extra_args: Vec<String>,
}

impl LaunchArgs {
    pub fn new(config_file: impl Into<PathBuf>, flags: FlagMap) -> Self {
        Self {
            config_file: config_file.into(),
            flags,
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    /// Render the argument vector; this is the only place flag values become text.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(2 + self.flags.len() + self.extra_args.len());
        if !self.config_file.as_os_str().is_empty() {
            argv.push(CONFIG_FILE_ARG.to_string());
            argv.push(self.config_file.display().to_string());
        }
        argv.extend(self.flags.to_args());
        argv.extend(self.extra_args.iter().cloned());
        argv
    }
}
