//! Simulated backends for hosts without the device hardware.
//!
//! Fault injection is driven by `PMON_SIM_*` environment variables so the
//! CLI's failure paths can be exercised end to end.

use chrono::{Datelike, Timelike, Utc};
use pmon_config::Config;
use pmon_hardware::{SimulatedNetwork, SimulatedSensorBus, time_service_body};
use pmon_traits::UtcDateTime;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimKnobs {
    /// PMON_SIM_WIFI_DOWN: access point rejects the join.
    pub wifi_down: bool,
    /// PMON_SIM_INTERNET_DOWN: internet test URL unreachable.
    pub internet_down: bool,
    /// PMON_SIM_SERVER_MISMATCH: server test answers with the wrong body.
    pub server_mismatch: bool,
    /// PMON_SIM_POST_FAIL: every post gets HTTP 500.
    pub post_fail: bool,
    /// PMON_SIM_TIME_DOWN: time service unreachable.
    pub time_down: bool,
    /// PMON_SIM_SENSOR_INIT_FAILURES: failed sensor bring-ups before success.
    pub sensor_init_failures: u32,
    /// PMON_SIM_READ_FAIL_EVERY: corrupt every Nth sensor frame.
    pub read_fail_every: u32,
}

fn flag(v: Option<String>) -> bool {
    matches!(v.as_deref(), Some("1" | "true" | "yes"))
}

fn count(v: Option<String>) -> u32 {
    v.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

impl SimKnobs {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            wifi_down: flag(lookup("PMON_SIM_WIFI_DOWN")),
            internet_down: flag(lookup("PMON_SIM_INTERNET_DOWN")),
            server_mismatch: flag(lookup("PMON_SIM_SERVER_MISMATCH")),
            post_fail: flag(lookup("PMON_SIM_POST_FAIL")),
            time_down: flag(lookup("PMON_SIM_TIME_DOWN")),
            sensor_init_failures: count(lookup("PMON_SIM_SENSOR_INIT_FAILURES")),
            read_fail_every: count(lookup("PMON_SIM_READ_FAIL_EVERY")),
        }
    }
}

pub fn sensor_bus(knobs: &SimKnobs) -> SimulatedSensorBus {
    SimulatedSensorBus::new()
        .with_init_failures(knobs.sensor_init_failures)
        .with_read_fail_every(knobs.read_fail_every)
}

fn now_utc() -> UtcDateTime {
    let now = Utc::now();
    // chrono keeps these in range; the casts cannot truncate.
    UtcDateTime {
        year: now.year(),
        month: now.month() as u8,
        day: now.day() as u8,
        hour: now.hour() as u8,
        minute: now.minute() as u8,
        second: now.second() as u8,
    }
}

/// Route every configured endpoint, minus the ones knocked out by `knobs`.
pub fn network(cfg: &Config, knobs: &SimKnobs) -> SimulatedNetwork {
    let ep = &cfg.endpoints;
    let net = SimulatedNetwork::new();
    if !knobs.internet_down {
        net.set_route(&ep.internet_test_url, 200, "");
    }
    let server_body = if knobs.server_mismatch {
        "maintenance".to_string()
    } else {
        ep.server_expected_response.clone()
    };
    net.set_route(&ep.server_test_url, 200, server_body);
    if knobs.post_fail {
        net.set_route(&ep.server_post_url, 500, r#"{"error":"internal"}"#);
    } else {
        net.set_route(&ep.server_post_url, 201, r#"{"status":"created"}"#);
    }
    if !knobs.time_down {
        net.set_route(&ep.time_url, 200, time_service_body(&now_utc()));
    }
    net
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn knobs_parse_flags_and_counts() {
        let env: HashMap<&str, &str> = [
            ("PMON_SIM_WIFI_DOWN", "1"),
            ("PMON_SIM_POST_FAIL", "true"),
            ("PMON_SIM_SERVER_MISMATCH", "0"),
            ("PMON_SIM_SENSOR_INIT_FAILURES", "3"),
            ("PMON_SIM_READ_FAIL_EVERY", "x"),
        ]
        .into_iter()
        .collect();
        let k = SimKnobs::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert!(k.wifi_down && k.post_fail);
        assert!(!k.server_mismatch && !k.internet_down && !k.time_down);
        assert_eq!(k.sensor_init_failures, 3);
        assert_eq!(k.read_fail_every, 0);
    }
}
