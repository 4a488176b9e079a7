//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "cruise", version, about = "Cruise-speed decision engine CLI")]
pub struct Cli {
    /// Path to config TOML (typed); built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and print results as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recorded drive trace through the arbiter and print a summary
    Replay {
        /// Drive-trace CSV (strict header)
        #[arg(long, value_name = "FILE")]
        trace: PathBuf,
        /// Also print every Nth tick (0 prints the summary only)
        #[arg(long, value_name = "N", default_value_t = 0)]
        every: u64,
        /// Override one store key for this run, e.g. `--param CruiseSpeedMin=20`
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, i64)>,
    },
    /// Validate the config file and exit
    CheckConfig,
    /// Print every tunable as the arbiter would read it
    ShowParams,
}

/// `KEY=VALUE` with an integer value.
pub fn parse_param(s: &str) -> Result<(String, i64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("value for {key} must be an integer: {e}"))?;
    Ok((key.to_string(), value))
}
