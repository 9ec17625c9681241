//! `From` implementations bridging `pmon_config` types to `pmon_core` types.

use std::time::Duration;

use crate::config::{CadenceCfg, EndpointCfg, NetworkCfg, WifiCfg};

// ── CadenceCfg ───────────────────────────────────────────────────────────────

impl From<&pmon_config::Cadence> for CadenceCfg {
    fn from(c: &pmon_config::Cadence) -> Self {
        Self {
            read_cadence: Duration::from_millis(c.read_ms),
            reads_before_post: c.reads_before_post,
            retries_before_offline: c.retries_before_offline,
            failure_pause: Duration::from_millis(c.failure_pause_ms),
        }
    }
}

// ── NetworkCfg ───────────────────────────────────────────────────────────────

impl From<&pmon_config::Wifi> for WifiCfg {
    fn from(c: &pmon_config::Wifi) -> Self {
        Self {
            ssid: c.ssid.clone(),
            password: c.password.clone(),
        }
    }
}

impl From<&pmon_config::Endpoints> for EndpointCfg {
    fn from(c: &pmon_config::Endpoints) -> Self {
        Self {
            internet_test_url: c.internet_test_url.clone(),
            server_test_url: c.server_test_url.clone(),
            server_expected_response: c.server_expected_response.clone(),
            server_post_url: c.server_post_url.clone(),
            time_url: c.time_url.clone(),
        }
    }
}

impl From<&pmon_config::Config> for NetworkCfg {
    fn from(c: &pmon_config::Config) -> Self {
        Self {
            device_id: c.device.id.clone(),
            wifi: (&c.wifi).into(),
            endpoints: (&c.endpoints).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_cadence_matches_runtime_default() {
        let from_file: CadenceCfg = (&pmon_config::Cadence::default()).into();
        let runtime = CadenceCfg::default();
        assert_eq!(from_file.read_cadence, runtime.read_cadence);
        assert_eq!(from_file.reads_before_post, runtime.reads_before_post);
        assert_eq!(from_file.retries_before_offline, runtime.retries_before_offline);
        assert_eq!(from_file.failure_pause, runtime.failure_pause);
    }
}
