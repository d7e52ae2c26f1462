//! Telemetry sinks for prestart environment payloads.
use std::{
    fs,
    path::{Path, PathBuf},
};

use ignite_core::telemetry::{TelemetryError, TelemetrySink};
use ignite_model::EnvironmentPayload;
use tracing::debug;

/// Emits the payload as a debug-level JSON event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn send(&self, payload: &EnvironmentPayload) -> Result<(), TelemetryError> {
        let json =
            serde_json::to_string(payload).map_err(|e| TelemetryError::Encode(e.to_string()))?;
        debug!(target: "ignite::telemetry", payload = %json, "environment");
        Ok(())
    }
}

/// Writes the payload as pretty JSON, replacing the previous report.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TelemetrySink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn send(&self, payload: &EnvironmentPayload) -> Result<(), TelemetryError> {
        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent {
            if !dir.is_dir() {
                return Err(TelemetryError::Unavailable(format!(
                    "directory '{}' does not exist",
                    dir.display()
                )));
            }
        }
        let mut json = serde_json::to_string_pretty(payload)
            .map_err(|e| TelemetryError::Encode(e.to_string()))?;
        json.push('\n');

        // Write then rename so readers never see a partial report.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignite_model::{PrestartReport, TunerResult};

    fn payload() -> EnvironmentPayload {
        let mut report = PrestartReport::new();
        report.tuners.push(TunerResult::succeeded("swappiness"));
        EnvironmentPayload::new(&report, None, r#"{"node":{}}"#.into())
    }

    #[test]
    fn log_sink_never_fails() {
        assert!(LogSink.send(&payload()).is_ok());
    }

    #[test]
    fn file_sink_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("report.json"));
        sink.send(&payload()).unwrap();

        let raw = fs::read_to_string(sink.path()).unwrap();
        assert!(raw.contains("\n  \"tuners\""));
        let parsed: EnvironmentPayload = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, payload());
        assert!(!dir.path().join("report.json.tmp").exists());
    }

    #[test]
    fn file_sink_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("missing").join("report.json"));
        assert!(matches!(
            sink.send(&payload()),
            Err(TelemetryError::Unavailable(_))
        ));
    }
}
