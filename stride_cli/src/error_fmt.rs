//! Human-readable error descriptions, exit codes and structured JSON errors.

use thiserror::Error;

/// Failures the CLI classifies before they reach the engine.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("trace error: {0}")]
    Trace(String),
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use stride_core::error::{BuildError, EngineError};

    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: A missing file, a TOML syntax error or an out-of-range value.\nHow to fix: Edit the config file, then rerun `stride self-check`."
            ),
            CliError::Trace(msg) if msg.contains("must have headers") => {
                "Invalid headers in trace CSV. Expected 't_ms,ax,ay,az'.".to_string()
            }
            CliError::Trace(msg) => format!(
                "What happened: The trace could not be replayed ({msg}).\nLikely causes: Wrong path, a malformed row or timestamps going backwards.\nHow to fix: Check the CSV; rows are t_ms,ax,ay,az with non-decreasing t_ms."
            ),
        };
    }

    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: The engine rejected its configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
        );
    }

    if let Some(ee) = err.downcast_ref::<EngineError>() {
        return match ee {
            EngineError::Stopped | EngineError::ActorPanicked => format!(
                "What happened: {ee}.\nLikely causes: The engine thread exited early.\nHow to fix: Re-run with --log-level=debug and check the log for the first error."
            ),
            EngineError::State(_) => format!(
                "What happened: {ee}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 invalid config, 4 trace error, 1 anything else.
/// Usage errors exit with 2 from clap before reaching here.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::InvalidConfig(_) => 3,
            CliError::Trace(_) => 4,
        };
    }
    if err.downcast_ref::<stride_core::error::BuildError>().is_some() {
        return 3;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    use stride_core::error::{BuildError, EngineError};
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::InvalidConfig(_) => "InvalidConfig",
            CliError::Trace(_) => "Trace",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::Stopped) => "Stopped",
        Some(EngineError::ActorPanicked) => "ActorPanicked",
        Some(EngineError::State(_)) => "Engine",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "type": "error",
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
