//! The monitor control loop.
//!
//! Startup runs once: sensor bring-up (retried forever), then the
//! connectivity stages Wi-Fi → internet → clock sync → server, each of which
//! short-circuits into offline mode on failure. The steady state reads,
//! posts every `reads_before_post` iterations while online, displays and
//! sleeps. Offline is absorbing.

use std::convert::Infallible;
use std::sync::Arc;

use pmon_traits::Clock;

use crate::capabilities::{ClockSync, ConnectivityGate, PresentationSink, Reporter, Session};
use crate::config::CadenceCfg;
use crate::error::{MonitorError, Result};
use crate::model::{LoopState, Mode, PostFailure, Stage};
use crate::sensor::{SensorHandle, SensorSource};
use crate::status::Iteration;

pub struct Monitor {
    pub(crate) sensor: SensorSource,
    pub(crate) handle: Option<SensorHandle>,
    pub(crate) gate: Box<dyn ConnectivityGate>,
    pub(crate) reporter: Box<dyn Reporter>,
    pub(crate) clock_sync: Box<dyn ClockSync>,
    pub(crate) display: Box<dyn PresentationSink>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) cadence: CadenceCfg,
    pub(crate) session: Option<Session>,
    pub(crate) state: LoopState,
}

impl core::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("state", &self.state)
            .field("has_session", &self.session.is_some())
            .field("sensor_ready", &self.handle.is_some())
            .finish()
    }
}

impl Monitor {
    /// Start building a Monitor.
    pub fn builder() -> crate::builder::MonitorBuilder {
        crate::builder::MonitorBuilder::default()
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Startup then the steady-state loop. Returns only on a fatal error.
    pub fn run(&mut self) -> Result<Infallible> {
        self.startup()?;
        loop {
            self.step()?;
        }
    }

    /// One-time startup sequencing. Returns the mode the loop starts in.
    ///
    /// A clock-sync failure is not absorbed into offline mode; it is
    /// returned as `MonitorError::ClockSync`.
    pub fn startup(&mut self) -> Result<Mode> {
        tracing::info!("initializing");
        self.display.show_initializing();
        self.handle = Some(self.sensor.initialize(&mut *self.display)?);

        let mut online = match self.gate.connect_wifi() {
            Some(session) => {
                self.session = Some(session);
                true
            }
            None => {
                self.stage_failed(Stage::Wifi);
                false
            }
        };

        if online {
            online = self.check_stage(Stage::Internet, |g, s| g.test_internet(s));
        }

        if online && let Some(session) = self.session.as_mut() {
            self.clock_sync
                .sync(session)
                .map_err(MonitorError::ClockSync)?;
        }

        if online {
            online = self.check_stage(Stage::Server, |g, s| g.test_server(s));
        }

        let mode = if online { Mode::Online } else { Mode::Offline };
        if !online {
            tracing::info!("using offline mode");
        }
        self.state = LoopState::new(mode);
        Ok(mode)
    }

    /// One steady-state iteration.
    pub fn step(&mut self) -> Result<Iteration> {
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| MonitorError::State("sensor not initialized".into()))?;
        let m = self.sensor.read_with_retry(handle, &mut *self.display)?;

        let mut posted = false;
        if self.state.post_due(self.cadence.reads_before_post) {
            self.state.begin_post();
            let session = self
                .session
                .as_mut()
                .ok_or_else(|| MonitorError::State("online without a session".into()))?;
            match self.reporter.post(session, &m) {
                Ok(()) => {
                    self.state.post_succeeded();
                    posted = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "error posting measurement to server");
                    match self.state.post_failed(self.cadence.retries_before_offline) {
                        PostFailure::Downgrade => {
                            tracing::warn!("switching to offline mode");
                            self.clock.sleep(self.cadence.read_cadence);
                            return Ok(Iteration::Downgraded);
                        }
                        PostFailure::Retry { streak } => {
                            tracing::info!(streak, "retrying on next cycle");
                            self.display.show_retrying(Stage::PostingToServer);
                            self.clock.sleep(self.cadence.read_cadence);
                            return Ok(Iteration::PostFailed { streak });
                        }
                    }
                }
            }
        }

        self.state.record_read();
        self.display.show_measurement(&m, self.state.mode().is_online());
        self.clock.sleep(self.cadence.read_cadence);
        Ok(Iteration::Displayed { posted })
    }

    fn check_stage(
        &mut self,
        stage: Stage,
        test: fn(&mut dyn ConnectivityGate, &mut Session) -> bool,
    ) -> bool {
        let passed = match self.session.as_mut() {
            Some(session) => test(&mut *self.gate, session),
            None => false,
        };
        if !passed {
            self.stage_failed(stage);
        }
        passed
    }

    fn stage_failed(&mut self, stage: Stage) {
        tracing::warn!(%stage, "connection failed, entering offline mode");
        self.display.show_connection_failed(stage);
        self.clock.sleep(self.cadence.failure_pause);
    }
}
