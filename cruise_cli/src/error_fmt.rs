//! Human-readable error descriptions and structured JSON error formatting.

use cruise_core::error::CruiseError;

/// First error of type `E` anywhere in the report's chain.
fn find<E: std::error::Error + 'static>(err: &eyre::Report) -> Option<&E> {
    err.chain().find_map(|e| e.downcast_ref::<E>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = find::<CruiseError>(err) {
        return match ce {
            CruiseError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: An out-of-range value in the TOML.\nHow to fix: Edit the config file, then rerun `check-config`."
            ),
            CruiseError::Trace { tick, reason } => format!(
                "What happened: Trace row for tick {tick} could not be replayed ({reason}).\nLikely causes: A NaN or inf written by the recorder.\nHow to fix: Fix or drop the row and replay again."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(te) = find::<toml::de::Error>(err) {
        return format!(
            "What happened: The config file is not valid TOML.\nLikely causes: A typo or a value of the wrong type.\nHow to fix: Correct the file and rerun. Parser said: {te}"
        );
    }

    let msg = err
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    let lower = msg.to_ascii_lowercase();

    // Trace CSV header special-case
    if lower.contains("trace csv must have headers") {
        return format!(
            "Invalid headers in trace CSV. Expected '{}'.",
            cruise_config::TRACE_HEADERS.join(",")
        );
    }

    if lower.contains("open trace csv") || lower.contains("read config") {
        return format!(
            "What happened: An input file could not be opened.\nLikely causes: Wrong path or missing permissions.\nHow to fix: Check the path and rerun. Original: {msg}"
        );
    }

    // Generic fallback
    format!(
        "Something went wrong.\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 invalid config, 4 bad trace data, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match find::<CruiseError>(err) {
        Some(CruiseError::InvalidConfig(_)) => 3,
        Some(CruiseError::Trace { .. }) => 4,
        _ if find::<toml::de::Error>(err).is_some() => 3,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match find::<CruiseError>(err) {
        Some(CruiseError::InvalidConfig(_)) => "InvalidConfig",
        Some(CruiseError::Trace { .. }) => "Trace",
        _ if find::<toml::de::Error>(err).is_some() => "InvalidConfig",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "reason": reason_name(err), "message": humanize(err) });
    if let Some(CruiseError::Trace { tick, .. }) = find::<CruiseError>(err) {
        obj["details"] = json!({ "tick": tick });
    }
    obj.to_string()
}
