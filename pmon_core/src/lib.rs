#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Particulate monitor control loop (hardware-agnostic).
//!
//! This crate owns the monitor's state machine. Hardware is reached through
//! `pmon_traits::SensorBus`, `pmon_traits::WifiRadio` and
//! `pmon_traits::RealTimeClock`; the display through [`PresentationSink`].
//!
//! ## Architecture
//!
//! - **Sensor**: bring-up and reads, retried forever at a fixed pause (`sensor`, `retry`)
//! - **Connectivity**: layered Wi-Fi → internet → server checks (`gate`)
//! - **Time**: one-shot RTC sync from a time service (`time_sync`)
//! - **Upload**: JSON measurement posts (`reporter`)
//! - **Control**: startup sequencing and the steady-state loop (`monitor`)
//!
//! ## Modes
//!
//! The monitor starts online only if every startup check passes. Offline is
//! absorbing: once the post-failure streak is exhausted the process never
//! posts again.

pub mod builder;
pub mod capabilities;
pub mod config;
pub mod conversions;
pub mod error;
pub mod gate;
pub mod hw_error;
pub mod mocks;
pub mod model;
pub mod monitor;
pub mod reporter;
pub mod retry;
pub mod sensor;
pub mod status;
pub mod time_sync;

pub use builder::MonitorBuilder;
pub use capabilities::{ClockSync, ConnectivityGate, PresentationSink, Reporter, Session};
pub use config::{CadenceCfg, EndpointCfg, NetworkCfg, WifiCfg};
pub use error::{
    BuildError, ClockSyncError, GateError, MonitorError, PostError, Report, Result, SensorFault,
    Severity,
};
pub use gate::HttpGate;
pub use model::{LoopState, Measurement, Mode, PostFailure, Stage};
pub use monitor::Monitor;
pub use reporter::{HttpReporter, MeasurementPayload, encode_payload};
pub use retry::{Exhausted, RetryPolicy, retry};
pub use sensor::{SensorHandle, SensorSource};
pub use status::Iteration;
pub use time_sync::{HttpClockSync, parse_time_response};
