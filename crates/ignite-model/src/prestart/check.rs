use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

/// How a failing check affects the prestart run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// Aborts the run.
    Fatal,
    /// Logged, optionally remediated; the run continues.
    Warning,
}

/// Stable identity of a check, used to key remediation actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckerId(Cow<'static, str>);

impl CheckerId {
    pub const DATA_DIRECTORY: Self = Self::from_static("data-directory");
    pub const SWAP: Self = Self::from_static("swap");
    pub const AIO_EVENTS: Self = Self::from_static("aio-events");

    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a single environment check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub checker: CheckerId,
    pub desc: String,
    pub required: String,
    pub current: String,
    pub severity: Severity,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    /// Start a result for `checker`; it is not ok until [`CheckResult::ok`] says so.
    pub fn new(checker: CheckerId, desc: impl Into<String>, severity: Severity) -> Self {
        Self {
            checker,
            desc: desc.into(),
            required: String::new(),
            current: String::new(),
            severity,
            ok: false,
            error: None,
        }
    }

    pub fn required(mut self, required: impl ToString) -> Self {
        self.required = required.to_string();
        self
    }

    pub fn current(mut self, current: impl ToString) -> Self {
        self.current = current.to_string();
        self
    }

    pub fn ok(mut self, ok: bool) -> Self {
        self.ok = ok;
        self
    }

    /// Attach the error that prevented the check from reading its current value.
    ///
    /// A check that errored is never ok.
    pub fn with_error(mut self, err: impl ToString) -> Self {
        self.error = Some(err.to_string());
        self.ok = false;
        self
    }

    /// Human-readable description of the discrepancy.
    pub fn failure_message(&self) -> String {
        format!(
            "System check '{}' failed. Required: {}, Current: {}",
            self.desc, self.required, self.current
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWAP: CheckerId = CheckerId::from_static("swap");

    #[test]
    fn builder_fills_fields() {
        let r = CheckResult::new(SWAP, "Swap disabled", Severity::Warning)
            .required(true)
            .current(false)
            .ok(false);

        assert_eq!(r.checker, CheckerId::new("swap"));
        assert_eq!(r.required, "true");
        assert_eq!(r.current, "false");
        assert!(!r.ok);
        assert_eq!(
            r.failure_message(),
            "System check 'Swap disabled' failed. Required: true, Current: false"
        );
    }

    #[test]
    fn error_forces_not_ok() {
        let r = CheckResult::new(SWAP, "Swap disabled", Severity::Warning)
            .ok(true)
            .with_error("cannot read /proc/swaps");
        assert!(!r.ok);
        assert_eq!(r.error.as_deref(), Some("cannot read /proc/swaps"));
    }

    #[test]
    fn serializes_camel_case_without_empty_error() {
        let r = CheckResult::new(SWAP, "Swap disabled", Severity::Fatal).ok(true);
        let json = serde_json::to_string(&r).unwrap();

        assert!(json.contains("\"checker\":\"swap\""));
        assert!(json.contains("\"severity\":\"fatal\""));
        assert!(!json.contains("error"));
    }
}
