//! Error taxonomy shared by providers, extraction and the server

use thiserror::Error;

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The provider cannot resolve the event or session (unknown track,
    /// unraced event, missing archive payload)
    #[error("session data unavailable: {0}")]
    DataUnavailable(String),

    /// The selected driver has no timed, non-deleted lap in the session
    #[error("no lap data for driver {driver}")]
    NoLapData { driver: String },

    /// The raw telemetry stream lacks a channel the extractor needs
    #[error("telemetry is missing the {0} channel")]
    MissingTelemetryField(&'static str),

    #[error("telemetry channel {channel} has {found} samples, expected {expected}")]
    MalformedTelemetry {
        channel: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("invalid session payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
