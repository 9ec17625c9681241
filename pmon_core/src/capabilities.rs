//! Capabilities the control loop drives.
//!
//! The monitor only ever talks to these traits; `gate`, `reporter` and
//! `time_sync` provide the HTTP-backed implementations, and `pmon_ui`
//! provides a text display.

use chrono::NaiveDateTime;
use pmon_traits::HttpClient;

use crate::error::{ClockSyncError, PostError};
use crate::model::{Measurement, Stage};

/// Established network session: a joined Wi-Fi link plus a request client.
///
/// Created once at startup and kept for the life of the process, even after
/// the monitor goes offline.
pub struct Session {
    client: Box<dyn HttpClient>,
}

impl Session {
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self { client }
    }

    pub fn client(&mut self) -> &mut dyn HttpClient {
        &mut *self.client
    }
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

/// Layered startup checks. Each call is a single attempt; failures are
/// reported as `None`/`false` and never retried here.
pub trait ConnectivityGate {
    fn connect_wifi(&mut self) -> Option<Session>;
    fn test_internet(&mut self, session: &mut Session) -> bool;
    fn test_server(&mut self, session: &mut Session) -> bool;
}

pub trait Reporter {
    fn post(&mut self, session: &mut Session, m: &Measurement) -> Result<(), PostError>;
}

/// Network time source that programs the board's RTC.
pub trait ClockSync {
    fn sync(&mut self, session: &mut Session) -> Result<NaiveDateTime, ClockSyncError>;
}

/// Fire-and-forget screen updates.
pub trait PresentationSink {
    fn show_initializing(&mut self);
    fn show_measurement(&mut self, m: &Measurement, online: bool);
    fn show_connection_failed(&mut self, stage: Stage);
    fn show_retrying(&mut self, stage: Stage);
}
