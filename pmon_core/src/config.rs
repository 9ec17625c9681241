//! Runtime configuration used by `Monitor`.
//!
//! These are separate from the TOML-deserialized config in `pmon_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

/// Loop timing and thresholds.
#[derive(Debug, Clone)]
pub struct CadenceCfg {
    /// Sleep at the end of every iteration.
    pub read_cadence: Duration,
    /// Display-only iterations before a post attempt.
    pub reads_before_post: u32,
    /// Consecutive post failures tolerated before the downgrade.
    pub retries_before_offline: u32,
    /// Pause after a failed sensor call or startup stage.
    pub failure_pause: Duration,
}

impl Default for CadenceCfg {
    fn default() -> Self {
        Self {
            read_cadence: Duration::from_secs(5),
            reads_before_post: 12,
            retries_before_offline: 3,
            failure_pause: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WifiCfg {
    pub ssid: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct EndpointCfg {
    pub internet_test_url: String,
    pub server_test_url: String,
    pub server_expected_response: String,
    pub server_post_url: String,
    pub time_url: String,
}

/// Everything the HTTP-backed gate, reporter and clock sync need.
#[derive(Debug, Clone, Default)]
pub struct NetworkCfg {
    pub device_id: String,
    pub wifi: WifiCfg,
    pub endpoints: EndpointCfg,
}
