//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pmon", version, about = "Particulate monitor CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/pmon.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor: startup checks, then read/display/post forever
    Run {
        /// Stop after this many loop iterations (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        iterations: Option<u64>,
        /// Colour the console screens
        #[arg(long, action = ArgAction::SetTrue)]
        color: bool,
        /// Do not draw screens on stdout
        #[arg(long, action = ArgAction::SetTrue)]
        no_display: bool,
    },
    /// Bring the sensor up and take one reading
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}
