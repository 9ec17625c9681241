//! Builder for `Monitor`.
//!
//! Capabilities are boxed so the CLI can pick simulated or hardware backends
//! at runtime. `with_http_network` wires the HTTP gate, reporter and clock
//! sync from one `NetworkCfg`.

use std::sync::Arc;

use pmon_traits::clock::{Clock, MonotonicClock};
use pmon_traits::{RealTimeClock, SensorBus, WifiRadio};

use crate::capabilities::{ClockSync, ConnectivityGate, PresentationSink, Reporter};
use crate::config::{CadenceCfg, NetworkCfg};
use crate::error::{BuildError, Result};
use crate::gate::HttpGate;
use crate::model::{LoopState, Mode};
use crate::monitor::Monitor;
use crate::reporter::HttpReporter;
use crate::retry::RetryPolicy;
use crate::sensor::SensorSource;
use crate::time_sync::HttpClockSync;

/// Builder for `Monitor`. All fields are validated on `build()`.
#[derive(Default)]
pub struct MonitorBuilder {
    sensor_bus: Option<Box<dyn SensorBus>>,
    gate: Option<Box<dyn ConnectivityGate>>,
    reporter: Option<Box<dyn Reporter>>,
    clock_sync: Option<Box<dyn ClockSync>>,
    display: Option<Box<dyn PresentationSink>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    cadence: Option<CadenceCfg>,
    sensor_attempts: Option<u32>,
}

impl MonitorBuilder {
    pub fn with_sensor_bus(mut self, bus: impl SensorBus + 'static) -> Self {
        self.sensor_bus = Some(Box::new(bus));
        self
    }

    pub fn with_gate(mut self, gate: impl ConnectivityGate + 'static) -> Self {
        self.gate = Some(Box::new(gate));
        self
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    pub fn with_clock_sync(mut self, sync: impl ClockSync + 'static) -> Self {
        self.clock_sync = Some(Box::new(sync));
        self
    }

    pub fn with_display(mut self, display: impl PresentationSink + 'static) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Inject a clock (e.g., a virtual test clock). Defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_cadence(mut self, cadence: CadenceCfg) -> Self {
        self.cadence = Some(cadence);
        self
    }

    /// Cap sensor init/read attempts. Unset means retry forever.
    pub fn with_sensor_attempts(mut self, attempts: u32) -> Self {
        self.sensor_attempts = Some(attempts);
        self
    }

    /// Wire the HTTP gate, reporter and clock sync over one radio.
    pub fn with_http_network(
        self,
        radio: impl WifiRadio + 'static,
        rtc: impl RealTimeClock + 'static,
        net: &NetworkCfg,
    ) -> Self {
        self.with_gate(HttpGate::new(
            Box::new(radio),
            net.wifi.clone(),
            net.endpoints.clone(),
        ))
        .with_reporter(HttpReporter::new(
            net.device_id.clone(),
            net.endpoints.server_post_url.clone(),
        ))
        .with_clock_sync(HttpClockSync::new(
            net.endpoints.time_url.clone(),
            Box::new(rtc),
        ))
    }

    pub fn build(self) -> Result<Monitor> {
        let bus = self
            .sensor_bus
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let gate = self
            .gate
            .ok_or_else(|| eyre::Report::new(BuildError::MissingGate))?;
        let reporter = self
            .reporter
            .ok_or_else(|| eyre::Report::new(BuildError::MissingReporter))?;
        let clock_sync = self
            .clock_sync
            .ok_or_else(|| eyre::Report::new(BuildError::MissingClockSync))?;
        let display = self
            .display
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDisplay))?;
        let cadence = self.cadence.unwrap_or_default();

        // ── Validation ───────────────────────────────────────────────────────
        if cadence.reads_before_post == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "reads_before_post must be >= 1",
            )));
        }
        if cadence.read_cadence.is_zero() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "read_cadence must be > 0",
            )));
        }
        if cadence.failure_pause.is_zero() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "failure_pause must be > 0",
            )));
        }
        if self.sensor_attempts == Some(0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "sensor_attempts must be >= 1",
            )));
        }

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };
        let policy = match self.sensor_attempts {
            Some(n) => RetryPolicy::bounded(cadence.failure_pause, n),
            None => RetryPolicy::forever(cadence.failure_pause),
        };

        Ok(Monitor {
            sensor: SensorSource::new(bus, clock.clone(), policy),
            handle: None,
            gate,
            reporter,
            clock_sync,
            display,
            clock,
            cadence,
            session: None,
            state: LoopState::new(Mode::Offline),
        })
    }
}
