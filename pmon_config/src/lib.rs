#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the particle monitor.
//!
//! - `Config` and sub-structs are deserialized from TOML.
//! - `apply_env` layers the device's settings keys (`DEVICE_ID`,
//!   `CIRCUITPY_WIFI_SSID`, ...) over the file, so a bare environment is
//!   enough to configure a unit.
//! - `validate` rejects anything the control loop cannot run with.
use serde::Deserialize;
use std::path::Path;

/// Default time source used to program the RTC.
pub const DEFAULT_TIME_URL: &str = "https://timeapi.io/api/Time/current/zone?timeZone=utc";

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Device {
    /// Identifier sent as `deviceId` with every measurement.
    pub id: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Wifi {
    pub ssid: String,
    /// Empty for open networks.
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Endpoints {
    /// Any URL that answers 200 when the internet is reachable.
    pub internet_test_url: String,
    /// Availability endpoint of the measurement server.
    pub server_test_url: String,
    /// Exact body the availability endpoint must return.
    pub server_expected_response: String,
    pub server_post_url: String,
    /// JSON UTC time source (`year`, `month`, `day`, `hour`, `minute`, `seconds`).
    pub time_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            internet_test_url: String::new(),
            server_test_url: String::new(),
            server_expected_response: String::new(),
            server_post_url: String::new(),
            time_url: DEFAULT_TIME_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Cadence {
    /// Pause between loop iterations (ms).
    pub read_ms: u64,
    /// Display-only iterations between two post attempts.
    pub reads_before_post: u32,
    /// Consecutive post failures tolerated before going offline for good.
    pub retries_before_offline: u32,
    /// Pause after a failed sensor call or a failed startup stage (ms).
    pub failure_pause_ms: u64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            read_ms: 5_000,
            reads_before_post: 12,
            retries_before_offline: 3,
            failure_pause_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Sensor {
    /// Linux I2C bus number (hardware builds only).
    pub i2c_bus: u8,
    /// 7-bit I2C address of the PMSA003I.
    pub i2c_address: u16,
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            i2c_bus: 1,
            i2c_address: 0x12,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub device: Device,
    #[serde(default)]
    pub wifi: Wifi,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub cadence: Cadence,
    #[serde(default)]
    pub sensor: Sensor,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file, then apply overrides from the process
/// environment. Validation is left to the caller.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let mut cfg =
        load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.apply_env(|k| std::env::var(k).ok());
    Ok(cfg)
}

/// Settings keys understood by `apply_env`, in the order they are applied.
pub const ENV_KEYS: [&str; 7] = [
    "DEVICE_ID",
    "CIRCUITPY_WIFI_SSID",
    "CIRCUITPY_WIFI_PASSWORD",
    "INTERNET_CONNECTION_TEST_URL",
    "SERVER_CONNECTION_TEST_URL",
    "SERVER_CONNECTION_EXPECTED_RESPONSE",
    "SERVER_POST_URL",
];

impl Config {
    /// Override fields from key/value settings. `lookup` is usually
    /// `std::env::var`; tests pass a map.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for key in ENV_KEYS {
            let Some(value) = lookup(key) else { continue };
            let slot = match key {
                "DEVICE_ID" => &mut self.device.id,
                "CIRCUITPY_WIFI_SSID" => &mut self.wifi.ssid,
                "CIRCUITPY_WIFI_PASSWORD" => &mut self.wifi.password,
                "INTERNET_CONNECTION_TEST_URL" => &mut self.endpoints.internet_test_url,
                "SERVER_CONNECTION_TEST_URL" => &mut self.endpoints.server_test_url,
                "SERVER_CONNECTION_EXPECTED_RESPONSE" => {
                    &mut self.endpoints.server_expected_response
                }
                "SERVER_POST_URL" => &mut self.endpoints.server_post_url,
                _ => continue,
            };
            *slot = value;
        }
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Identity
        if self.device.id.trim().is_empty() {
            eyre::bail!("device.id must be set (or DEVICE_ID)");
        }
        if self.wifi.ssid.is_empty() {
            eyre::bail!("wifi.ssid must be set (or CIRCUITPY_WIFI_SSID)");
        }

        // Endpoints
        check_url("endpoints.internet_test_url", &self.endpoints.internet_test_url)?;
        check_url("endpoints.server_test_url", &self.endpoints.server_test_url)?;
        check_url("endpoints.server_post_url", &self.endpoints.server_post_url)?;
        check_url("endpoints.time_url", &self.endpoints.time_url)?;
        if self.endpoints.server_expected_response.is_empty() {
            eyre::bail!("endpoints.server_expected_response must be set");
        }

        // Cadence
        if self.cadence.read_ms == 0 {
            eyre::bail!("cadence.read_ms must be >= 1");
        }
        if self.cadence.read_ms > 60 * 60 * 1000 {
            eyre::bail!("cadence.read_ms is unreasonably large (>1h)");
        }
        if self.cadence.reads_before_post == 0 {
            eyre::bail!("cadence.reads_before_post must be >= 1");
        }
        if self.cadence.failure_pause_ms == 0 {
            eyre::bail!("cadence.failure_pause_ms must be >= 1");
        }
        if self.cadence.failure_pause_ms > 60 * 60 * 1000 {
            eyre::bail!("cadence.failure_pause_ms is unreasonably large (>1h)");
        }

        // Sensor
        if self.sensor.i2c_address > 0x7f {
            eyre::bail!("sensor.i2c_address must be a 7-bit address");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}

fn check_url(name: &str, url: &str) -> eyre::Result<()> {
    if url.is_empty() {
        eyre::bail!("{name} must be set");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        eyre::bail!("{name} must be an http(s) URL, got {url:?}");
    }
    Ok(())
}
