pub mod cache;
pub mod clock;
pub mod format;
pub mod snapshot;
pub mod source;

pub use cache::TelemetryCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use format::{format_for_prompt, METADATA_UNAVAILABLE, NO_METADATA};
pub use snapshot::LiveStateSnapshot;
pub use source::{FileTelemetrySource, TelemetrySource};

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry file {path} is missing")]
    Missing { path: String },
    #[error("failed to read telemetry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
