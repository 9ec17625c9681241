#![allow(dead_code)]
//! Scripted capabilities for driving `Monitor` in tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDateTime;
use pmon_core::error::{ClockSyncError, PostError};
use pmon_core::mocks::RecordingDisplay;
use pmon_core::{CadenceCfg, ClockSync, ConnectivityGate, Measurement, Monitor, Reporter, Session};
use pmon_traits::clock::test_clock::TestClock;
use pmon_traits::{BoxError, HttpClient, HttpResponse, ParticleSensor, PmReading, SensorBus};

pub const READING: PmReading = PmReading {
    pm10_standard: 3,
    pm25_standard: 7,
    pm100_standard: 15,
};

/// Client that is never expected to be called by scripted capabilities.
pub struct NullClient;

impl HttpClient for NullClient {
    fn get(&mut self, _url: &str) -> Result<HttpResponse, BoxError> {
        Err("null client".into())
    }
    fn post(&mut self, _url: &str, _ct: &str, _body: &str) -> Result<HttpResponse, BoxError> {
        Err("null client".into())
    }
}

// ── Sensor ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SensorLog {
    pub init_calls: u32,
    pub read_calls: u32,
}

/// Bus that fails `init_failures` times, then yields a sensor whose reads
/// follow `reads` (`None` = error) and then return `READING` forever.
#[derive(Clone)]
pub struct ScriptedBus {
    init_failures: u32,
    reads: Arc<Mutex<VecDeque<Option<PmReading>>>>,
    pub log: Arc<Mutex<SensorLog>>,
}

impl ScriptedBus {
    pub fn new(init_failures: u32, reads: Vec<Option<PmReading>>) -> Self {
        Self {
            init_failures,
            reads: Arc::new(Mutex::new(reads.into())),
            log: Arc::default(),
        }
    }

    pub fn healthy() -> Self {
        Self::new(0, Vec::new())
    }
}

impl SensorBus for ScriptedBus {
    fn initialize(&mut self) -> Result<Box<dyn ParticleSensor>, BoxError> {
        let mut log = self.log.lock().unwrap();
        log.init_calls += 1;
        if log.init_calls <= self.init_failures {
            return Err("no ack from 0x12".into());
        }
        Ok(Box::new(ScriptedSensor {
            reads: self.reads.clone(),
            log: self.log.clone(),
        }))
    }
}

struct ScriptedSensor {
    reads: Arc<Mutex<VecDeque<Option<PmReading>>>>,
    log: Arc<Mutex<SensorLog>>,
}

impl ParticleSensor for ScriptedSensor {
    fn read(&mut self) -> Result<PmReading, BoxError> {
        self.log.lock().unwrap().read_calls += 1;
        match self.reads.lock().unwrap().pop_front() {
            Some(Some(r)) => Ok(r),
            Some(None) => Err("read timed out".into()),
            None => Ok(READING),
        }
    }
}

// ── Connectivity ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct GateLog {
    pub wifi_calls: u32,
    pub internet_calls: u32,
    pub server_calls: u32,
}

#[derive(Clone)]
pub struct ScriptedGate {
    pub wifi: bool,
    pub internet: bool,
    pub server: bool,
    pub log: Arc<Mutex<GateLog>>,
}

impl ScriptedGate {
    pub fn new(wifi: bool, internet: bool, server: bool) -> Self {
        Self {
            wifi,
            internet,
            server,
            log: Arc::default(),
        }
    }

    pub fn calls(&self) -> GateLog {
        *self.log.lock().unwrap()
    }
}

impl ConnectivityGate for ScriptedGate {
    fn connect_wifi(&mut self) -> Option<Session> {
        self.log.lock().unwrap().wifi_calls += 1;
        self.wifi.then(|| Session::new(Box::new(NullClient)))
    }
    fn test_internet(&mut self, _session: &mut Session) -> bool {
        self.log.lock().unwrap().internet_calls += 1;
        self.internet
    }
    fn test_server(&mut self, _session: &mut Session) -> bool {
        self.log.lock().unwrap().server_calls += 1;
        self.server
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

/// Reporter whose outcomes follow `script` (true = accepted), then `fallback`.
#[derive(Clone)]
pub struct ScriptedReporter {
    script: Arc<Mutex<VecDeque<bool>>>,
    fallback: bool,
    pub posted: Arc<Mutex<Vec<Measurement>>>,
}

impl ScriptedReporter {
    pub fn new(script: Vec<bool>, fallback: bool) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            fallback,
            posted: Arc::default(),
        }
    }

    pub fn always(ok: bool) -> Self {
        Self::new(Vec::new(), ok)
    }

    pub fn attempts(&self) -> usize {
        self.posted.lock().unwrap().len()
    }
}

impl Reporter for ScriptedReporter {
    fn post(&mut self, _session: &mut Session, m: &Measurement) -> Result<(), PostError> {
        self.posted.lock().unwrap().push(*m);
        let ok = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);
        if ok { Ok(()) } else { Err(PostError::Status(500)) }
    }
}

// ── Clock sync ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ScriptedSync {
    pub ok: bool,
    pub calls: Arc<Mutex<u32>>,
}

impl ScriptedSync {
    pub fn new(ok: bool) -> Self {
        Self {
            ok,
            calls: Arc::default(),
        }
    }

    pub fn count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

impl ClockSync for ScriptedSync {
    fn sync(&mut self, _session: &mut Session) -> Result<NaiveDateTime, ClockSyncError> {
        *self.calls.lock().unwrap() += 1;
        if self.ok {
            Ok(NaiveDateTime::default())
        } else {
            Err(ClockSyncError::Transport("dns lookup failed".into()))
        }
    }
}

// ── Harness ──────────────────────────────────────────────────────────────────

pub fn fast_cadence() -> CadenceCfg {
    CadenceCfg {
        read_cadence: Duration::from_secs(5),
        reads_before_post: 12,
        retries_before_offline: 3,
        failure_pause: Duration::from_secs(5),
    }
}

/// Handles kept by the test after the capabilities move into the monitor.
pub struct Probes {
    pub bus: ScriptedBus,
    pub gate: ScriptedGate,
    pub reporter: ScriptedReporter,
    pub sync: ScriptedSync,
    pub display: RecordingDisplay,
    pub clock: TestClock,
}

pub fn monitor(
    bus: ScriptedBus,
    gate: ScriptedGate,
    reporter: ScriptedReporter,
    sync: ScriptedSync,
    cadence: CadenceCfg,
) -> (Monitor, Probes) {
    let display = RecordingDisplay::new();
    let clock = TestClock::new();
    let m = Monitor::builder()
        .with_sensor_bus(bus.clone())
        .with_gate(gate.clone())
        .with_reporter(reporter.clone())
        .with_clock_sync(sync.clone())
        .with_display(display.clone())
        .with_clock(clock.clone())
        .with_cadence(cadence)
        .build()
        .expect("monitor builds");
    (
        m,
        Probes {
            bus,
            gate,
            reporter,
            sync,
            display,
            clock,
        },
    )
}

pub fn online_monitor(reporter: ScriptedReporter) -> (Monitor, Probes) {
    monitor(
        ScriptedBus::healthy(),
        ScriptedGate::new(true, true, true),
        reporter,
        ScriptedSync::new(true),
        fast_cadence(),
    )
}
