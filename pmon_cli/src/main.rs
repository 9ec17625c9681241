mod cli;
mod error_fmt;
mod logging;
mod run;
mod sim;

use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use pmon_core::mocks::NullDisplay;
use pmon_core::{Monitor, Stage};
use pmon_traits::{ParticleSensor, SensorBus};
use pmon_ui::ConsoleDisplay;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::{RunSummary, build_monitor, drive, mode_name};
use crate::sim::SimKnobs;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        tracing::error!(error = %e, "exiting with error");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = pmon_config::load_file(&cli.config)?;
    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let _log_guard = logging::init(cli.json, &level, &cfg.logging)?;
    cfg.validate()?;
    tracing::debug!(config = %cli.config.display(), device = %cfg.device.id, "config loaded");

    let knobs = SimKnobs::from_env();

    match cli.cmd {
        Commands::Run {
            iterations,
            color,
            no_display,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;

            // Screens share stdout with the JSON summary, so JSON mode hides them.
            let mut monitor = if no_display || cli.json {
                build_monitor(&cfg, &knobs, NullDisplay)?
            } else {
                let color = color && std::io::stdout().is_terminal();
                build_monitor(
                    &cfg,
                    &knobs,
                    ConsoleDisplay::new(std::io::stdout()).with_color(color),
                )?
            };
            let summary = drive(&mut monitor, iterations, &shutdown)?;
            report(&summary, cli.json);
        }
        Commands::SelfCheck => self_check(&cfg, &knobs, cli.json)?,
        Commands::Health => health(&cfg, &knobs, cli.json)?,
    }
    Ok(())
}

fn report(s: &RunSummary, json: bool) {
    if json {
        println!("{}", s.to_json());
    } else {
        println!(
            "Monitor stopped after {} iterations (mode: {}, posts: {}, failed posts: {})",
            s.iterations,
            mode_name(s.mode),
            s.posts,
            s.failed_posts
        );
    }
}

/// Bring the sensor up once and read a single measurement.
fn self_check(cfg: &pmon_config::Config, knobs: &SimKnobs, json: bool) -> eyre::Result<()> {
    #[cfg(feature = "hardware")]
    let mut bus = {
        let _ = knobs;
        pmon_hardware::pmsa003i::Pmsa003iBus::new(cfg.sensor.i2c_bus, cfg.sensor.i2c_address)
    };
    #[cfg(not(feature = "hardware"))]
    let mut bus = {
        let _ = cfg;
        sim::sensor_bus(knobs)
    };

    let mut sensor = bus
        .initialize()
        .map_err(|e| eyre::eyre!("{} failed: {e}", Stage::SensorInit))?;
    let r = sensor
        .read()
        .map_err(|e| eyre::eyre!("{} failed: {e}", Stage::SensorReading))?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "pm10": r.pm10_standard,
                "pm25": r.pm25_standard,
                "pm100": r.pm100_standard,
            })
        );
    } else {
        println!(
            "OK: PM1 {} PM2.5 {} PM10 {}",
            r.pm10_standard, r.pm25_standard, r.pm100_standard
        );
    }
    Ok(())
}

/// Config is valid and the monitor can be assembled. No network traffic.
fn health(cfg: &pmon_config::Config, knobs: &SimKnobs, json: bool) -> eyre::Result<()> {
    let monitor: Monitor = build_monitor(cfg, knobs, NullDisplay)?;
    tracing::debug!(?monitor, "monitor assembled");
    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "device_id": cfg.device.id,
                "reads_before_post": cfg.cadence.reads_before_post,
                "retries_before_offline": cfg.cadence.retries_before_offline,
            })
        );
    } else {
        println!("healthy: device {}", cfg.device.id);
    }
    Ok(())
}
