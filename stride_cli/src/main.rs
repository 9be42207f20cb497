mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{CliError, exit_code_for_error, format_error_json, humanize};

fn main() {
    // clap exits with code 2 on usage errors
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: could not install color-eyre: {e}");
    }

    let code = match real_main(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                println!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_logging(&cli, &cfg.logging)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match cli.cmd {
        Commands::Run {
            duration_ms,
            cadence_hz,
            amplitude,
        } => {
            let stop = Arc::new(AtomicBool::new(false));
            let flag = stop.clone();
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }
            let sum = run::run_live(&cfg, duration_ms, cadence_hz, amplitude, &stop, cli.json)?;
            run::print_summary(&sum, cli.json);
        }
        Commands::Replay { trace } => {
            let sum = run::run_replay(&cfg, &trace, cli.json)?;
            run::print_summary(&sum, cli.json);
        }
        Commands::SelfCheck => {
            let steps = run::self_check(&cfg)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "type": "self_check", "status": "ok", "steps": steps })
                );
            } else {
                println!("self-check ok ({steps} steps from synthetic walk)");
            }
        }
    }
    Ok(())
}

/// Read, parse and validate the TOML config; defaults when no path is given.
fn load_config(path: Option<&Path>) -> eyre::Result<stride_config::Config> {
    let invalid = |msg: String| eyre::Report::new(CliError::InvalidConfig(msg));
    let cfg = match path {
        None => stride_config::Config::default(),
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .map_err(|e| invalid(format!("read {}: {e}", p.display())))?;
            stride_config::load_toml(&text)
                .map_err(|e| invalid(format!("parse {}: {e}", p.display())))?
        }
    };
    cfg.validate().map_err(|e| invalid(e.to_string()))?;
    Ok(cfg)
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Console logs go to stderr so stdout stays reserved for command output.
/// An optional JSON file sink is written through a non-blocking appender.
fn init_logging(cli: &Cli, logging: &stride_config::Logging) -> eyre::Result<()> {
    let level = cli
        .log_level
        .clone()
        .or_else(|| logging.level.clone())
        .unwrap_or_else(|| "info".to_string());

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if cli.json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(env_filter(&level))
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter(&level))
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
            .ok_or_else(|| eyre::Report::new(CliError::InvalidConfig(format!(
                "logging.file has no file name: {file}"
            ))))?;
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("create log directory {}", dir.display()))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(env_filter(&level))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("initialize logging")?;
    Ok(())
}
