use std::{path::PathBuf, time::Duration};

use clap::{ArgAction, ArgMatches, Args, Parser, Subcommand, parser::ValueSource};
use ignite_core::flags::CliFlags;
use ignite_model::{FlagMap, names};
use ignite_observe::{LoggerFormat, LoggerLevel};

use crate::duration::parse_duration;

#[derive(Parser, Debug)]
#[command(name = "ignite", version, about = "Prepare the host and start the daemon")]
pub struct Cli {
    /// Log filter, e.g. `info` or `ignite_core=debug,info`.
    #[arg(long, global = true, env = "IGNITE_LOG_LEVEL", default_value = "info")]
    pub log_level: LoggerLevel,
    /// text, json or journald.
    #[arg(long, global = true, env = "IGNITE_LOG_FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check and tune the host, then start the daemon.
    Start(StartArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Configuration file; searched in the usual locations when absent.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory holding `bin/<binary>`.
    #[arg(long)]
    pub install_dir: Option<PathBuf>,
    /// Run the enabled tuners before starting.
    #[arg(long, default_value_t = false, num_args = 0..=1, require_equals = true,
          default_missing_value = "true", action = ArgAction::Set)]
    pub tune: bool,
    /// Run the system checks before starting.
    #[arg(long, default_value_t = true, num_args = 0..=1, require_equals = true,
          default_missing_value = "true", action = ArgAction::Set)]
    pub check: bool,
    /// Bound for blocking operations in checks and tuners (`300ms`, `10s`, `2m`).
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub timeout: Duration,
    /// `<vendor>:<vm type>:<storage type>` of pre-measured I/O characteristics.
    #[arg(long = "well-known-io")]
    pub well_known_io: Option<String>,
    /// Final say on a daemon flag: `name=value` or `name`. Repeatable.
    #[arg(long = "override", value_name = "FLAG")]
    pub overrides: Vec<String>,

    #[command(flatten)]
    pub daemon: DaemonFlags,

    /// Passed to the daemon verbatim.
    #[arg(last = true)]
    pub extra: Vec<String>,
}

/// Flags forwarded to the daemon.
#[derive(Args, Debug, Clone)]
pub struct DaemonFlags {
    #[arg(long, hide = true)]
    pub memory: Option<String>,
    #[arg(long = "lock-memory", hide = true, default_value_t = false, num_args = 0..=1,
          require_equals = true, default_missing_value = "true", action = ArgAction::Set)]
    pub lock_memory: bool,
    #[arg(long = "reserve-memory", hide = true)]
    pub reserve_memory: Option<String>,
    #[arg(long, hide = true)]
    pub hugepages: Option<PathBuf>,
    #[arg(long, hide = true)]
    pub cpuset: Option<String>,
    #[arg(long = "io-properties-file", hide = true)]
    pub io_properties_file: Option<PathBuf>,
    #[arg(long = "io-properties", hide = true)]
    pub io_properties: Option<String>,
    #[arg(long, hide = true, default_value_t = 0)]
    pub smp: u32,
    #[arg(long = "thread-affinity", hide = true, default_value_t = true, num_args = 0..=1,
          require_equals = true, default_missing_value = "true", action = ArgAction::Set)]
    pub thread_affinity: bool,
    #[arg(long = "num-io-queues", hide = true, default_value_t = 0)]
    pub num_io_queues: u32,
    #[arg(long = "max-io-requests", hide = true, default_value_t = 0)]
    pub max_io_requests: u32,
    #[arg(long, hide = true, default_value_t = true, num_args = 0..=1,
          require_equals = true, default_missing_value = "true", action = ArgAction::Set)]
    pub mbind: bool,
    #[arg(long, hide = true, default_value_t = true, num_args = 0..=1,
          require_equals = true, default_missing_value = "true", action = ArgAction::Set)]
    pub overprovisioned: bool,
}

impl DaemonFlags {
    /// Current value of every daemon flag; unset text and path flags are empty.
    pub fn values(&self) -> FlagMap {
        let mut flags = FlagMap::new();
        flags
            .insert(names::MEMORY, self.memory.clone().unwrap_or_default())
            .insert(names::LOCK_MEMORY, self.lock_memory)
            .insert(names::RESERVE_MEMORY, self.reserve_memory.clone().unwrap_or_default())
            .insert(names::HUGEPAGES, self.hugepages.clone().unwrap_or_default())
            .insert(names::CPUSET, self.cpuset.clone().unwrap_or_default())
            .insert(
                names::IO_PROPERTIES_FILE,
                self.io_properties_file.clone().unwrap_or_default(),
            )
            .insert(names::IO_PROPERTIES, self.io_properties.clone().unwrap_or_default())
            .insert(names::SMP, self.smp)
            .insert(names::THREAD_AFFINITY, self.thread_affinity)
            .insert(names::NUM_IO_QUEUES, self.num_io_queues)
            .insert(names::MAX_IO_REQUESTS, self.max_io_requests)
            .insert(names::MBIND, self.mbind)
            .insert(names::OVERPROVISIONED, self.overprovisioned);
        flags
    }
}

impl StartArgs {
    /// Daemon flags with explicitness taken from where clap found each value.
    ///
    /// `matches` are the `start` subcommand's matches.
    pub fn cli_flags(&self, matches: &ArgMatches) -> CliFlags {
        let mut cli = CliFlags::new(self.daemon.values());
        for name in names::DAEMON_FLAGS {
            let id = name.replace('-', "_");
            if matches.value_source(&id) == Some(ValueSource::CommandLine) {
                cli.mark_explicit(name);
            }
        }
        match &self.well_known_io {
            Some(id) => cli.with_well_known_io(id),
            None => cli,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};
    use ignite_model::FlagValue;

    fn parse(argv: &[&str]) -> (StartArgs, CliFlags) {
        let matches = Cli::command()
            .try_get_matches_from(std::iter::once("ignite").chain(argv.iter().copied()))
            .unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        let sub = matches.subcommand_matches("start").unwrap();
        let Commands::Start(args) = cli.command;
        let flags = args.cli_flags(sub);
        (args, flags)
    }

    #[test]
    fn start_defaults() {
        let (args, flags) = parse(&["start"]);
        assert!(args.check);
        assert!(!args.tune);
        assert_eq!(args.timeout, Duration::from_secs(10));
        assert!(args.overrides.is_empty());
        for name in names::DAEMON_FLAGS {
            assert!(!flags.is_explicit(name), "{name} explicit by default");
        }
    }

    #[test]
    fn typed_flags_are_explicit() {
        let (_, flags) = parse(&["start", "--smp", "4", "--lock-memory", "--mbind=false"]);
        assert_eq!(flags.explicit_value(names::SMP), Some(&FlagValue::from(4u32)));
        assert_eq!(flags.explicit_value(names::LOCK_MEMORY), Some(&FlagValue::from(true)));
        assert_eq!(flags.explicit_value(names::MBIND), Some(&FlagValue::from(false)));
        assert!(flags.explicit_value(names::OVERPROVISIONED).is_none());
    }

    #[test]
    fn value_equal_to_default_is_still_explicit() {
        let (_, flags) = parse(&["start", "--overprovisioned=true"]);
        assert!(flags.is_explicit(names::OVERPROVISIONED));
    }

    #[test]
    fn start_options_and_extra_args() {
        let (args, flags) = parse(&[
            "start",
            "--tune",
            "--check=false",
            "--timeout",
            "300ms",
            "--well-known-io",
            "aws:i3.large:nvme",
            "--override",
            "smp=2",
            "--override",
            "mbind",
            "--",
            "--developer-mode",
        ]);
        assert!(args.tune);
        assert!(!args.check);
        assert_eq!(args.timeout, Duration::from_millis(300));
        assert_eq!(args.overrides, vec!["smp=2", "mbind"]);
        assert_eq!(args.extra, vec!["--developer-mode"]);
        assert_eq!(flags.well_known_io(), Some("aws:i3.large:nvme"));
    }

    #[test]
    fn global_logging_options() {
        let matches = Cli::command()
            .try_get_matches_from(["ignite", "start", "--log-format", "json"])
            .unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        assert_eq!(cli.log_format, LoggerFormat::Json);
    }

    #[test]
    fn bad_timeout_is_rejected() {
        assert!(
            Cli::command()
                .try_get_matches_from(["ignite", "start", "--timeout", "10"])
                .is_err()
        );
    }
}
