#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod replay;

use std::path::Path;

use clap::Parser;
use cruise_core::error::CruiseError;
use eyre::{Result, WrapErr};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let _ = color_eyre::install();
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging);

    match cli.cmd {
        Commands::Replay {
            trace,
            every,
            params,
        } => {
            replay::run_replay(&cfg, &trace, every, &params, cli.json)?;
        }
        Commands::CheckConfig => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "ok": true,
                        "pcm_cruise": cfg.vehicle.pcm_cruise,
                        "is_metric": cfg.vehicle.is_metric,
                    })
                );
            } else {
                println!("config ok");
            }
        }
        Commands::ShowParams => replay::show_params(&cfg, cli.json),
    }
    Ok(())
}

/// Read, parse and validate the config; built-in defaults when no path is given.
fn load_config(path: Option<&Path>) -> Result<cruise_config::Config> {
    let cfg = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("read config {}", path.display()))?;
            cruise_config::load_toml(&text)
                .wrap_err_with(|| format!("parse config {}", path.display()))?
        }
        None => cruise_config::Config::default(),
    };
    cfg.validate()
        .map_err(|e| CruiseError::InvalidConfig(e.to_string()))?;
    Ok(cfg)
}

/// Console logs go to stderr so stdout stays machine-readable; an optional
/// JSON-lines file sink comes from `[logging]`.
fn init_tracing(json: bool, level: &str, logging: &cruise_config::Logging) {
    use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "cruise.log".into(), std::ffi::OsStr::to_os_string);
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let file_level = logging.level.as_deref().unwrap_or("info");
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(file_level))
                .boxed(),
        );
    }

    let _ = tracing_subscriber::registry().with(layers).try_init();
}
