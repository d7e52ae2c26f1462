//! Best-effort delivery of environment payloads.
use ignite_model::EnvironmentPayload;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for environment payloads.
pub trait TelemetrySink {
    fn name(&self) -> &'static str;

    fn send(&self, payload: &EnvironmentPayload) -> Result<(), TelemetryError>;
}

/// Hand `payload` to every sink. Failures are logged and never returned.
pub fn send_environment(sinks: &[Box<dyn TelemetrySink + '_>], payload: &EnvironmentPayload) {
    for sink in sinks {
        match sink.send(payload) {
            Ok(()) => debug!(sink = sink.name(), "environment data sent"),
            Err(e) => warn!(sink = sink.name(), "couldn't send environment data: {e}"),
        }
    }
}
