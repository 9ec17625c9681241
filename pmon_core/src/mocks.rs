//! Test and helper mocks for pmon_core

use std::sync::{Arc, Mutex};

use crate::capabilities::PresentationSink;
use crate::model::{Measurement, Stage};

/// One screen update, as seen by [`RecordingDisplay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    Initializing,
    Measurement {
        pm10: u16,
        pm25: u16,
        pm100: u16,
        online: bool,
    },
    ConnectionFailed(Stage),
    Retrying(Stage),
}

/// Display that records every update. Clones share the same log, so a test
/// can keep one clone and hand the other to the monitor.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    events: Arc<Mutex<Vec<DisplayEvent>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    pub fn measurements(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DisplayEvent::Measurement { .. }))
            .count()
    }

    fn push(&self, ev: DisplayEvent) {
        if let Ok(mut g) = self.events.lock() {
            g.push(ev);
        }
    }
}

impl PresentationSink for RecordingDisplay {
    fn show_initializing(&mut self) {
        self.push(DisplayEvent::Initializing);
    }

    fn show_measurement(&mut self, m: &Measurement, online: bool) {
        self.push(DisplayEvent::Measurement {
            pm10: m.pm10_standard,
            pm25: m.pm25_standard,
            pm100: m.pm100_standard,
            online,
        });
    }

    fn show_connection_failed(&mut self, stage: Stage) {
        self.push(DisplayEvent::ConnectionFailed(stage));
    }

    fn show_retrying(&mut self, stage: Stage) {
        self.push(DisplayEvent::Retrying(stage));
    }
}

/// A display that drops everything; for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl PresentationSink for NullDisplay {
    fn show_initializing(&mut self) {}
    fn show_measurement(&mut self, _m: &Measurement, _online: bool) {}
    fn show_connection_failed(&mut self, _stage: Stage) {}
    fn show_retrying(&mut self, _stage: Stage) {}
}
