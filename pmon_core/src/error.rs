use thiserror::Error;

use crate::model::Stage;

/// How a failure affects the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Retried locally; the loop keeps its mode.
    Transient,
    /// Ends online operation for the rest of the process.
    Downgrade,
    /// Ends the control loop.
    Fatal,
}

/// Classified cause behind a boxed sensor error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SensorFault {
    #[error("sensor timeout")]
    Timeout,
    #[error("bad sensor frame: {0}")]
    Frame(String),
    #[error("sensor bus error: {0}")]
    Bus(String),
}

#[derive(Debug, Error, Clone)]
pub enum MonitorError {
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(SensorFault),
    #[error("sensor read failed: {0}")]
    SensorRead(SensorFault),
    #[error("gave up on {stage} after {attempts} attempts")]
    RetriesExhausted { stage: Stage, attempts: u32 },
    #[error("clock sync failed: {0}")]
    ClockSync(#[from] ClockSyncError),
    #[error("invalid state: {0}")]
    State(String),
}

impl MonitorError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::SensorUnavailable(_) | Self::SensorRead(_) => Severity::Transient,
            Self::RetriesExhausted { .. } | Self::ClockSync(_) | Self::State(_) => Severity::Fatal,
        }
    }
}

/// Startup connectivity failures. Each one downgrades the run to offline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("wi-fi connection failed: {0}")]
    WifiConnect(String),
    #[error("internet unreachable: {0}")]
    InternetUnreachable(String),
    #[error("server unreachable: {0}")]
    ServerUnreachable(String),
}

impl GateError {
    pub fn severity(&self) -> Severity {
        Severity::Downgrade
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostError {
    #[error("payload encoding failed: {0}")]
    Encode(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("unparseable response body: {0}")]
    InvalidResponse(String),
}

impl PostError {
    /// A single failed post is transient; the streak counter decides when
    /// failures add up to a downgrade.
    pub fn severity(&self) -> Severity {
        Severity::Transient
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockSyncError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("time server answered HTTP {0}")]
    Status(u16),
    #[error("unparseable time response: {0}")]
    InvalidResponse(String),
    #[error("time server sent an impossible date: {0}")]
    InvalidTime(String),
    #[error("rtc write failed: {0}")]
    Rtc(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sensor bus")]
    MissingSensor,
    #[error("missing connectivity gate")]
    MissingGate,
    #[error("missing reporter")]
    MissingReporter,
    #[error("missing clock sync")]
    MissingClockSync,
    #[error("missing display")]
    MissingDisplay,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
