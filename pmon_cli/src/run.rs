//! Monitor assembly and the loop driver behind `pmon run`.

use std::sync::atomic::{AtomicBool, Ordering};

use pmon_config::Config;
use pmon_core::error::Result as CoreResult;
use pmon_core::{CadenceCfg, Iteration, Mode, Monitor, NetworkCfg, PresentationSink};
use pmon_hardware::{SimulatedRadio, SimulatedRtc};

use crate::sim::{self, SimKnobs};

pub fn mode_name(m: Mode) -> &'static str {
    match m {
        Mode::Online => "online",
        Mode::Offline => "offline",
    }
}

/// Wire config, backends and `display` into a ready-to-start monitor.
pub fn build_monitor(
    cfg: &Config,
    knobs: &SimKnobs,
    display: impl PresentationSink + 'static,
) -> CoreResult<Monitor> {
    let cadence: CadenceCfg = (&cfg.cadence).into();
    let net: NetworkCfg = cfg.into();
    let radio = SimulatedRadio::new(sim::network(cfg, knobs)).with_join(!knobs.wifi_down);

    let builder = Monitor::builder()
        .with_cadence(cadence)
        .with_http_network(radio, SimulatedRtc::new(), &net)
        .with_display(display);

    #[cfg(feature = "hardware")]
    let builder = {
        let _ = knobs;
        builder.with_sensor_bus(pmon_hardware::pmsa003i::Pmsa003iBus::new(
            cfg.sensor.i2c_bus,
            cfg.sensor.i2c_address,
        ))
    };
    #[cfg(not(feature = "hardware"))]
    let builder = builder.with_sensor_bus(sim::sensor_bus(knobs));

    builder.build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub startup_mode: Mode,
    pub mode: Mode,
    pub iterations: u64,
    pub posts: u64,
    pub failed_posts: u64,
    pub downgraded: bool,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "startup_mode": mode_name(self.startup_mode),
            "mode": mode_name(self.mode),
            "iterations": self.iterations,
            "posts": self.posts,
            "failed_posts": self.failed_posts,
            "downgraded": self.downgraded,
            "interrupted": self.interrupted,
        })
    }
}

/// Run startup, then step until `limit` iterations or `shutdown` is set.
pub fn drive(
    monitor: &mut Monitor,
    limit: Option<u64>,
    shutdown: &AtomicBool,
) -> CoreResult<RunSummary> {
    let startup_mode = monitor.startup()?;
    tracing::info!(mode = mode_name(startup_mode), "startup complete");

    let mut s = RunSummary {
        startup_mode,
        mode: startup_mode,
        iterations: 0,
        posts: 0,
        failed_posts: 0,
        downgraded: false,
        interrupted: false,
    };
    while limit.is_none_or(|n| s.iterations < n) {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!(iterations = s.iterations, "shutdown requested");
            s.interrupted = true;
            break;
        }
        match monitor.step()? {
            Iteration::Displayed { posted } => s.posts += u64::from(posted),
            Iteration::PostFailed { .. } => s.failed_posts += 1,
            Iteration::Downgraded => {
                s.failed_posts += 1;
                s.downgraded = true;
            }
        }
        s.iterations += 1;
    }
    s.mode = monitor.mode();
    Ok(s)
}
