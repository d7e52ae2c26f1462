use serde::{Deserialize, Serialize};

use crate::{CheckResult, TunerResult};

/// Everything learned during one prestart run, kept even when the run aborts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrestartReport {
    pub checks: Vec<CheckResult>,
    pub tuners: Vec<TunerResult>,
}

impl PrestartReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.ok)
    }
}

/// Environment snapshot handed to telemetry sinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentPayload {
    pub checks: Vec<CheckResult>,
    pub tuners: Vec<TunerResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    /// Raw configuration, as JSON text.
    pub config: String,
}

impl EnvironmentPayload {
    pub fn new(report: &PrestartReport, error: Option<String>, config: String) -> Self {
        Self {
            checks: report.checks.clone(),
            tuners: report.tuners.clone(),
            error_msg: error,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CheckerId, Severity};

    #[test]
    fn payload_carries_report_and_error() {
        let mut report = PrestartReport::new();
        report.checks.push(
            CheckResult::new(CheckerId::new("a"), "A", Severity::Warning).ok(false),
        );
        report.tuners.push(TunerResult::disabled("swappiness"));

        let payload = EnvironmentPayload::new(&report, Some("boom".into()), "{}".into());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["errorMsg"], "boom");
        assert_eq!(json["checks"].as_array().unwrap().len(), 1);
        assert_eq!(json["tuners"][0]["enabled"], false);
        assert_eq!(report.failed_checks().count(), 1);
    }
}
