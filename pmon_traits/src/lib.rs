pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type carried across every hardware boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One raw particulate frame as reported by the sensor.
///
/// Field names follow the sensor's register names: `pm10` is PM1.0,
/// `pm25` is PM2.5 and `pm100` is PM10, all in µg/m³ (standard particle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PmReading {
    pub pm10_standard: u16,
    pub pm25_standard: u16,
    pub pm100_standard: u16,
}

/// Bus-level entry point for the particulate sensor.
pub trait SensorBus {
    /// Bring the sensor up. Called again after a failure.
    fn initialize(&mut self) -> Result<Box<dyn ParticleSensor>, BoxError>;
}

pub trait ParticleSensor {
    fn read(&mut self) -> Result<PmReading, BoxError>;
}

/// Response returned by an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Request-capable client bound to a network link.
pub trait HttpClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, BoxError>;
    fn post(&mut self, url: &str, content_type: &str, body: &str)
    -> Result<HttpResponse, BoxError>;
}

pub trait WifiRadio {
    /// Create a request client backed by this radio's socket pool.
    fn open_client(&mut self) -> Result<Box<dyn HttpClient>, BoxError>;
    /// Signal strength of the access point, if known.
    fn rssi(&self) -> Option<i32>;
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), BoxError>;
}

/// Calendar date-time in UTC, already range-checked by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcDateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

pub trait RealTimeClock {
    fn set_utc(&mut self, t: UtcDateTime) -> Result<(), BoxError>;
}
