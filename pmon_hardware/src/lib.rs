//! Hardware backends for the particulate monitor.
//!
//! The PMSA003I I²C driver is behind the `hardware` feature. Everything else
//! here is a simulated stand-in (sensor, Wi-Fi radio, HTTP, RTC) for running
//! the monitor on a development host.

pub mod error;
pub mod pmsa003i;
pub mod util;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use pmon_traits::{
    BoxError, HttpClient, HttpResponse, ParticleSensor, PmReading, RealTimeClock, SensorBus,
    UtcDateTime, WifiRadio,
};

use crate::error::HwError;
use crate::pmsa003i::{PmFrame, decode_frame, encode_frame};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SensorStats {
    pub init_attempts: u32,
    pub reads: u32,
}

/// Simulated PMSA003I. Readings wobble around `base` and travel through the
/// real frame codec.
pub struct SimulatedSensorBus {
    init_failures: u32,
    read_fail_every: u32,
    base: PmReading,
    stats: Rc<RefCell<SensorStats>>,
}

impl Default for SimulatedSensorBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensorBus {
    pub fn new() -> Self {
        Self {
            init_failures: 0,
            read_fail_every: 0,
            base: PmReading {
                pm10_standard: 4,
                pm25_standard: 9,
                pm100_standard: 12,
            },
            stats: Rc::default(),
        }
    }

    /// Fail the first `n` initialize calls.
    pub fn with_init_failures(mut self, n: u32) -> Self {
        self.init_failures = n;
        self
    }

    /// Corrupt every `n`th frame (0 = never).
    pub fn with_read_fail_every(mut self, n: u32) -> Self {
        self.read_fail_every = n;
        self
    }

    pub fn with_base(mut self, base: PmReading) -> Self {
        self.base = base;
        self
    }

    pub fn stats(&self) -> Rc<RefCell<SensorStats>> {
        self.stats.clone()
    }
}

impl SensorBus for SimulatedSensorBus {
    fn initialize(&mut self) -> Result<Box<dyn ParticleSensor>, BoxError> {
        let attempt = {
            let mut s = self.stats.borrow_mut();
            s.init_attempts += 1;
            s.init_attempts
        };
        if attempt <= self.init_failures {
            return Err(Box::new(HwError::I2c("no ack from 0x12".into())));
        }
        tracing::debug!(attempt, "simulated sensor up");
        Ok(Box::new(SimulatedSensor {
            base: self.base,
            fail_every: self.read_fail_every,
            stats: self.stats.clone(),
        }))
    }
}

struct SimulatedSensor {
    base: PmReading,
    fail_every: u32,
    stats: Rc<RefCell<SensorStats>>,
}

impl ParticleSensor for SimulatedSensor {
    fn read(&mut self) -> Result<PmReading, BoxError> {
        let n = {
            let mut s = self.stats.borrow_mut();
            s.reads += 1;
            s.reads
        };
        let wobble = u16::try_from(n % 4).unwrap_or(0);
        let b = self.base;
        let frame = PmFrame {
            pm10_standard: b.pm10_standard.saturating_add(wobble),
            pm25_standard: b.pm25_standard.saturating_add(wobble),
            pm100_standard: b.pm100_standard.saturating_add(wobble),
            pm10_env: b.pm10_standard,
            pm25_env: b.pm25_standard,
            pm100_env: b.pm100_standard,
            particles: [500, 150, 30, 4, 1, 0],
        };
        let mut wire = encode_frame(&frame);
        if self.fail_every != 0 && n % self.fail_every == 0 {
            wire[9] ^= 0x5a;
        }
        let decoded = decode_frame(&wire).map_err(HwError::from)?;
        Ok(decoded.reading())
    }
}

/// One request seen by the simulated network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
}

/// Routing table shared by every client opened on a [`SimulatedRadio`].
/// Unrouted URLs fail like an unreachable host.
#[derive(Clone, Default)]
pub struct SimulatedNetwork {
    routes: Rc<RefCell<HashMap<String, HttpResponse>>>,
    requests: Rc<RefCell<Vec<SimRequest>>>,
}

impl SimulatedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.set_route(url, status, body);
        self
    }

    pub fn set_route(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.routes
            .borrow_mut()
            .insert(url.into(), HttpResponse::new(status, body));
    }

    pub fn unroute(&self, url: &str) {
        self.routes.borrow_mut().remove(url);
    }

    pub fn requests(&self) -> Vec<SimRequest> {
        self.requests.borrow().clone()
    }

    fn answer(&self, req: SimRequest) -> Result<HttpResponse, BoxError> {
        let resp = self.routes.borrow().get(&req.url).cloned();
        tracing::debug!(method = req.method, url = %req.url, status = ?resp.as_ref().map(|r| r.status), "simulated request");
        let url = req.url.clone();
        self.requests.borrow_mut().push(req);
        resp.ok_or_else(|| Box::new(HwError::Network(format!("no route to {url}"))) as BoxError)
    }
}

pub struct SimulatedHttpClient {
    net: SimulatedNetwork,
}

impl HttpClient for SimulatedHttpClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, BoxError> {
        self.net.answer(SimRequest {
            method: "GET",
            url: url.to_string(),
            body: None,
        })
    }

    fn post(
        &mut self,
        url: &str,
        _content_type: &str,
        body: &str,
    ) -> Result<HttpResponse, BoxError> {
        self.net.answer(SimRequest {
            method: "POST",
            url: url.to_string(),
            body: Some(body.to_string()),
        })
    }
}

pub struct SimulatedRadio {
    net: SimulatedNetwork,
    join_ok: bool,
    rssi: i32,
}

impl SimulatedRadio {
    pub fn new(net: SimulatedNetwork) -> Self {
        Self {
            net,
            join_ok: true,
            rssi: -58,
        }
    }

    /// Make the access point reject the join.
    pub fn with_join(mut self, ok: bool) -> Self {
        self.join_ok = ok;
        self
    }
}

impl WifiRadio for SimulatedRadio {
    fn open_client(&mut self) -> Result<Box<dyn HttpClient>, BoxError> {
        Ok(Box::new(SimulatedHttpClient {
            net: self.net.clone(),
        }))
    }

    fn rssi(&self) -> Option<i32> {
        Some(self.rssi)
    }

    fn connect(&mut self, ssid: &str, _password: &str) -> Result<(), BoxError> {
        if self.join_ok {
            Ok(())
        } else {
            Err(Box::new(HwError::Network(format!(
                "no access point named {ssid:?}"
            ))))
        }
    }
}

/// Body a UTC time service would send for `t`.
pub fn time_service_body(t: &UtcDateTime) -> String {
    format!(
        r#"{{"year":{},"month":{},"day":{},"hour":{},"minute":{},"seconds":{},"milliSeconds":0,"timeZone":"UTC"}}"#,
        t.year, t.month, t.day, t.hour, t.minute, t.second
    )
}

/// RTC that remembers the last time it was set.
#[derive(Clone, Default)]
pub struct SimulatedRtc {
    last: Rc<RefCell<Option<UtcDateTime>>>,
}

impl SimulatedRtc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_set(&self) -> Option<UtcDateTime> {
        *self.last.borrow()
    }
}

impl RealTimeClock for SimulatedRtc {
    fn set_utc(&mut self, t: UtcDateTime) -> Result<(), BoxError> {
        tracing::debug!(?t, "simulated rtc set");
        *self.last.borrow_mut() = Some(t);
        Ok(())
    }
}
