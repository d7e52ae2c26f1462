//! Prestart Pipeline.
//!
//! Runs environment checks and then hardware tuners, strictly one at a time,
//! accumulating a [`PrestartReport`] that survives an aborted run.
mod check;
pub use check::{Check, CheckRegistry};

mod remediation;
pub use remediation::{Remediation, RemediationTable};

mod tuner;
pub use tuner::{Support, TopologyProbe, TuneError, Tuner, TunerFactory, TunerParams};

use std::time::Duration;

use ignite_model::{CheckResult, Config, FlagMap, PrestartReport, Severity, TunerResult};
use tracing::{debug, info, instrument, warn};

use crate::error::CoreError;

/// Which phases run and with what budget.
#[derive(Debug, Clone)]
pub struct PrestartOptions {
    pub checks_enabled: bool,
    pub tune_enabled: bool,
    /// Forwarded to checks and tuners as the bound for their blocking operations.
    pub timeout: Duration,
    /// CPU set the daemon is restricted to; `None` or empty means all CPUs.
    pub cpuset: Option<String>,
}

impl Default for PrestartOptions {
    fn default() -> Self {
        Self {
            checks_enabled: true,
            tune_enabled: false,
            timeout: Duration::from_secs(10),
            cpuset: None,
        }
    }
}

/// Report of one run together with its outcome.
#[derive(Debug)]
pub struct PrestartRun {
    pub report: PrestartReport,
    pub result: Result<(), CoreError>,
}

impl PrestartRun {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_parts(self) -> (PrestartReport, Result<(), CoreError>) {
        (self.report, self.result)
    }
}

/// Sequential check-then-tune pipeline.
pub struct Prestart<'a> {
    checks: &'a CheckRegistry,
    tuners: &'a dyn TunerFactory,
    topology: &'a dyn TopologyProbe,
}

impl<'a> Prestart<'a> {
    pub fn new(
        checks: &'a CheckRegistry,
        tuners: &'a dyn TunerFactory,
        topology: &'a dyn TopologyProbe,
    ) -> Self {
        Self {
            checks,
            tuners,
            topology,
        }
    }

    /// Run the enabled phases.
    ///
    /// `flags` is held exclusively for the run and only handed to remediation
    /// actions, which are invoked synchronously.
    #[instrument(level = "debug", skip_all, fields(checks = opts.checks_enabled, tune = opts.tune_enabled))]
    pub fn run(
        &self,
        config: &Config,
        flags: &mut FlagMap,
        opts: &PrestartOptions,
        remediations: &RemediationTable,
    ) -> PrestartRun {
        let mut report = PrestartReport::new();

        if opts.checks_enabled {
            if let Err(e) = self.check(config, flags, opts.timeout, remediations, &mut report.checks) {
                return PrestartRun {
                    report,
                    result: Err(e),
                };
            }
            info!("System check - PASSED");
        }

        if opts.tune_enabled {
            if let Err(e) = self.tune(config, opts, &mut report.tuners) {
                return PrestartRun {
                    report,
                    result: Err(e),
                };
            }
            info!("System tune - PASSED");
        }

        PrestartRun {
            report,
            result: Ok(()),
        }
    }

    fn check(
        &self,
        config: &Config,
        flags: &mut FlagMap,
        timeout: Duration,
        remediations: &RemediationTable,
        results: &mut Vec<CheckResult>,
    ) -> Result<(), CoreError> {
        for check in self.checks.iter() {
            let result = check.run(config, timeout);
            results.push(result.clone());
            if result.ok {
                debug!(check = %result.desc, "system check passed");
                continue;
            }

            match result.severity {
                Severity::Fatal => {
                    return Err(CoreError::CheckFailed {
                        desc: result.desc,
                        required: result.required,
                        current: result.current,
                    });
                }
                Severity::Warning => {
                    if let Some(action) = remediations.get(&result.checker) {
                        debug!(checker = %result.checker, "applying remediation");
                        action.apply(&result, flags);
                    }
                    warn!("{}", result.failure_message());
                }
            }
        }
        Ok(())
    }

    fn tune(
        &self,
        config: &Config,
        opts: &PrestartOptions,
        results: &mut Vec<TunerResult>,
    ) -> Result<(), CoreError> {
        let cpu_mask = match opts.cpuset.as_deref().map(str::trim) {
            Some(expr) if !expr.is_empty() && expr != "all" => self.topology.translate(expr)?,
            _ => self.topology.all(opts.timeout)?,
        };
        let params = TunerParams {
            cpu_mask,
            directories: vec![config.node.data_directory.clone()],
            timeout: opts.timeout,
        };

        for name in self.tuners.available_tuners() {
            if !self.tuners.is_enabled(name, config) {
                info!(tuner = name, "Skipping disabled tuner");
                results.push(TunerResult::disabled(name));
                continue;
            }

            let tuner = match self.tuners.create(name, &params) {
                Ok(tuner) => tuner,
                Err(e) => {
                    results.push(TunerResult::failed(name, e.to_string()));
                    return Err(e);
                }
            };
            if let Support::Unsupported { reason } = tuner.check_if_supported() {
                debug!(tuner = name, reason = %reason, "tuner is not supported");
                results.push(TunerResult::unsupported(name));
                continue;
            }

            debug!(tuner = name, params = ?params, "running tuner");
            if let Err(e) = tuner.tune() {
                results.push(TunerResult::failed(name, e.to_string()));
                return Err(CoreError::TunerFailed {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
            }
            results.push(TunerResult::succeeded(name));
        }
        Ok(())
    }
}
