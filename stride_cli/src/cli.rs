//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "stride", version, about = "Step counter engine CLI")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines on stdout and JSON logs on stderr
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
    /// Count steps live from the simulated gait sensor (Ctrl-C to stop)
    Run {
        /// Stop after this many milliseconds; runs until Ctrl-C when omitted
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Simulated step bursts per second
        #[arg(long, value_name = "HZ", default_value_t = 1.0)]
        cadence_hz: f64,
        /// Simulated horizontal burst amplitude in g
        #[arg(long, value_name = "G", default_value_t = 1.5)]
        amplitude: f64,
    },
    /// Replay a recorded accelerometer trace (CSV: t_ms,ax,ay,az)
    Replay {
        #[arg(long, value_name = "FILE")]
        trace: PathBuf,
    },
    /// Validate the configuration and run a short synthetic walk
    SelfCheck,
}
