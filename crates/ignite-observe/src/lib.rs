mod logger;
pub use logger::*;

mod telemetry;
pub use telemetry::{FileSink, LogSink};
