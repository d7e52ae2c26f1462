//! `ignite start`: resolve flags, prepare the host, launch the daemon.
use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use ignite_core::{
    flags::{CliFlags, FlagResolver},
    io::IoResolver,
    launch::LaunchArgs,
    prestart::{CheckRegistry, Prestart, PrestartOptions, RemediationTable},
    telemetry::{TelemetrySink, send_environment},
};
use ignite_exec::{
    BuiltinIoTable, DaemonLauncher, DmiVendorProbe, HostFs, HostTunerFactory, SysfsTopology,
    find_install_dir, register_host_checks,
};
use ignite_model::{Config, EnvironmentPayload, FlagMap, PrestartReport, names};
use ignite_observe::{FileSink, LogSink};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{cli::StartArgs, config};

/// Exit code reported when the launch is interrupted.
const INTERRUPTED: u8 = 130;

/// Resolve the final flags and run the prestart pipeline against `host`.
///
/// Telemetry is sent whatever the outcome; a failed pipeline is returned as an error.
pub fn prepare(
    args: &StartArgs,
    cli: &CliFlags,
    config: &Config,
    host: &HostFs,
) -> anyhow::Result<FlagMap> {
    let vendor = DmiVendorProbe::new(host.clone());
    let table = BuiltinIoTable;
    let resolver = FlagResolver::new(IoResolver::new(&vendor, &table));

    let additional = config.prestart.additional_start_tokens();
    let mut flags = match resolver.resolve(config, cli, &additional) {
        Ok(flags) => flags,
        Err(e) => {
            report(config, &PrestartReport::new(), Some(e.to_string()));
            return Err(anyhow::Error::new(e).context("resolving daemon flags"));
        }
    };
    if !args.overrides.is_empty() {
        debug!(overrides = ?args.overrides, "applying overrides");
        flags.merge_overrides(&args.overrides);
    }

    let mut checks = CheckRegistry::new();
    register_host_checks(&mut checks, host);
    let tuners = HostTunerFactory::new(host.clone());
    let topology = SysfsTopology::new(host.clone());
    let remediations = RemediationTable::with_defaults();
    let opts = PrestartOptions {
        checks_enabled: args.check,
        tune_enabled: args.tune,
        timeout: args.timeout,
        cpuset: flags
            .rendered(names::CPUSET)
            .filter(|cpuset| !cpuset.is_empty()),
    };

    let (run_report, result) = Prestart::new(&checks, &tuners, &topology)
        .run(config, &mut flags, &opts, &remediations)
        .into_parts();

    report(config, &run_report, result.as_ref().err().map(ToString::to_string));

    result.context("prestart failed")?;
    Ok(flags)
}

/// Locate the install directory, reporting a failure before it propagates.
pub fn install_dir(args: &StartArgs, config: &Config) -> anyhow::Result<PathBuf> {
    find_install_dir(args.install_dir.as_deref(), config).map_err(|e| {
        report(config, &PrestartReport::new(), Some(e.to_string()));
        anyhow::Error::new(e).context("locating install directory")
    })
}

/// Send the environment payload to every configured sink.
fn report(config: &Config, report: &PrestartReport, error: Option<String>) {
    let payload = EnvironmentPayload::new(report, error, config::raw_json(config));
    send_environment(&sinks(config), &payload);
}

fn sinks(config: &Config) -> Vec<Box<dyn TelemetrySink>> {
    let mut sinks: Vec<Box<dyn TelemetrySink>> = vec![Box::new(LogSink)];
    if config.prestart.enable_usage_stats {
        match &config.prestart.telemetry_file {
            Some(path) => sinks.push(Box::new(FileSink::new(path))),
            None => debug!("usage stats enabled without a telemetry file"),
        }
    }
    sinks
}

/// Run the daemon until it exits or Ctrl-C is pressed.
pub fn launch(
    args: &StartArgs,
    config: &Config,
    install_dir: PathBuf,
    flags: FlagMap,
) -> anyhow::Result<ExitCode> {
    let launch_args =
        LaunchArgs::new(&config.config_file, flags).with_extra_args(args.extra.clone());
    let launcher = DaemonLauncher::new(install_dir, &config.node.binary, launch_args);
    info!(binary = %launcher.binary_path().display(), "starting daemon");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("interrupted, stopping daemon");
                    on_signal.cancel();
                }
                Err(e) => warn!("couldn't listen for Ctrl-C: {e}"),
            }
        });

        match launcher.run(cancel).await {
            Ok(status) => match status.code() {
                Some(0) => Ok(ExitCode::SUCCESS),
                Some(code) => {
                    error!(code, "daemon exited with an error");
                    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
                }
                None => {
                    error!(%status, "daemon terminated by signal");
                    Ok(ExitCode::FAILURE)
                }
            },
            Err(ignite_exec::ExecError::Canceled) => Ok(ExitCode::from(INTERRUPTED)),
            Err(e) => Err(anyhow::Error::new(e).context("launching daemon")),
        }
    })
}

pub fn run(args: &StartArgs, cli: &CliFlags) -> anyhow::Result<ExitCode> {
    let config = config::load(args.config.as_deref(), &config::default_candidates())?;
    // Before prestart, so tuners never touch a host we cannot launch on.
    let install_dir = install_dir(args, &config)?;
    let flags = prepare(args, cli, &config, &HostFs::system())?;
    launch(args, &config, install_dir, flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::{CommandFactory, FromArgMatches};
    use ignite_core::error::CoreError;
    use ignite_model::FlagValue;
    use std::{fs, path::Path};

    fn start(argv: &[&str]) -> (StartArgs, CliFlags) {
        let matches = Cli::command()
            .try_get_matches_from(["ignite", "start"].into_iter().chain(argv.iter().copied()))
            .unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        let crate::cli::Commands::Start(args) = cli.command;
        let flags = args.cli_flags(matches.subcommand_matches("start").unwrap());
        (args, flags)
    }

    fn put(root: &Path, abs: &str, content: &str) {
        let path = root.join(abs.trim_start_matches('/'));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Host with swap enabled, enough AIO events and four CPUs.
    fn host(root: &Path) -> HostFs {
        put(
            root,
            "/proc/swaps",
            "Filename\tType\tSize\tUsed\tPriority\n/swapfile file 1024 0 -2\n",
        );
        put(root, "/proc/sys/fs/aio-max-nr", "1048576\n");
        put(root, "/proc/sys/vm/swappiness", "60\n");
        put(root, "/sys/devices/system/cpu/online", "0-3\n");
        HostFs::new(root)
    }

    fn config(root: &Path) -> Config {
        let data = root.join("data");
        fs::create_dir_all(&data).unwrap();
        let mut config = Config::default();
        config.config_file = root.join("etc").join("ignite.yaml");
        config.node.data_directory = data;
        config.prestart.enable_memory_locking = Some(true);
        config.prestart.smp = Some(2);
        config.prestart.additional_start_flags = vec!["--abort-on-bad-alloc --smp=8".into()];
        config
    }

    #[test]
    fn swap_remediation_disables_memory_locking() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let (args, cli) = start(&[]);

        let flags = prepare(&args, &cli, &config(dir.path()), &host).unwrap();
        assert_eq!(flags.get(names::LOCK_MEMORY), Some(&FlagValue::from(false)));
        assert_eq!(flags.get(names::SMP), Some(&FlagValue::from(2u32)));
        assert_eq!(flags.get("abort-on-bad-alloc"), Some(&FlagValue::from(true)));
    }

    #[test]
    fn overrides_have_the_last_word() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let (args, cli) = start(&["--check=false", "--smp", "3", "--override", "smp=6"]);

        let flags = prepare(&args, &cli, &config(dir.path()), &host).unwrap();
        assert_eq!(flags.rendered(names::SMP).as_deref(), Some("6"));
        assert_eq!(flags.get(names::LOCK_MEMORY), Some(&FlagValue::from(true)));
    }

    #[test]
    fn tuning_writes_enabled_tuners_only() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let mut config = config(dir.path());
        config.prestart.tune_swappiness = true;
        let (args, cli) = start(&["--tune", "--cpuset", "1-2"]);

        prepare(&args, &cli, &config, &host).unwrap();
        assert_eq!(host.read_trimmed("/proc/sys/vm/swappiness").unwrap(), "1");
    }

    #[test]
    fn missing_data_directory_aborts_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let mut config = config(dir.path());
        config.node.data_directory = dir.path().join("missing");
        config.prestart.enable_usage_stats = true;
        config.prestart.telemetry_file = Some(dir.path().join("report.json"));
        let (args, cli) = start(&[]);

        let err = prepare(&args, &cli, &config, &host).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::CheckFailed { .. })
        ));

        let report: EnvironmentPayload =
            serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(report.checks.len(), 1);
        assert!(report.error_msg.is_some());
    }

    #[test]
    fn conflicting_io_sources_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let (args, cli) = start(&[
            "--io-properties-file",
            "/etc/io.yaml",
            "--well-known-io",
            "aws:i3.large:nvme",
        ]);

        let err = prepare(&args, &cli, &config(dir.path()), &host).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::ConfigurationConflict(_))
        ));
    }

    fn reporting(config: &mut Config, root: &Path) -> PathBuf {
        let file = root.join("report.json");
        config.prestart.enable_usage_stats = true;
        config.prestart.telemetry_file = Some(file.clone());
        file
    }

    fn read_report(file: &Path) -> EnvironmentPayload {
        serde_json::from_str(&fs::read_to_string(file).unwrap()).unwrap()
    }

    #[test]
    fn resolution_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let mut config = config(dir.path());
        let file = reporting(&mut config, dir.path());
        let (args, cli) = start(&["--io-properties", "x", "--well-known-io", "aws:i3.large:nvme"]);

        assert!(prepare(&args, &cli, &config, &host).is_err());

        let report = read_report(&file);
        assert!(report.checks.is_empty());
        assert!(report.tuners.is_empty());
        assert!(report.error_msg.unwrap().contains("conflict"));
    }

    #[test]
    fn missing_install_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        let file = reporting(&mut config, dir.path());
        let empty = dir.path().join("install");
        fs::create_dir_all(&empty).unwrap();
        let (args, _) = start(&["--install-dir", empty.to_str().unwrap()]);

        assert!(install_dir(&args, &config).is_err());
        assert!(read_report(&file).error_msg.is_some());
    }

    #[test]
    fn install_dir_is_found_without_reporting() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        let file = reporting(&mut config, dir.path());
        let bin = dir.path().join("install").join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("daemon"), "").unwrap();
        let (args, _) = start(&["--install-dir", dir.path().join("install").to_str().unwrap()]);

        assert_eq!(install_dir(&args, &config).unwrap(), dir.path().join("install"));
        assert!(!file.exists());
    }
}
