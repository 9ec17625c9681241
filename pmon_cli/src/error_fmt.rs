//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use pmon_core::error::{BuildError, ClockSyncError, MonitorError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range [cadence] values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            other => format!(
                "What happened: The monitor could not be assembled ({other}).\nLikely causes: A backend failed to initialize or was not wired into the builder.\nHow to fix: Re-run with --log-level=debug and check backend setup."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::ClockSync(cs) => {
                let cause = match cs {
                    ClockSyncError::Transport(_) | ClockSyncError::Status(_) => {
                        "time service unreachable or failing"
                    }
                    ClockSyncError::InvalidResponse(_) | ClockSyncError::InvalidTime(_) => {
                        "time service sent an unexpected body"
                    }
                    ClockSyncError::Rtc(_) => "the real-time clock rejected the write",
                };
                format!(
                    "What happened: Clock sync failed ({cs}).\nLikely causes: {cause}.\nHow to fix: Check endpoints.time_url and network access, then restart the monitor."
                )
            }
            MonitorError::RetriesExhausted { stage, attempts } => format!(
                "What happened: {stage} failed {attempts} times in a row.\nLikely causes: PMSA003I not wired, wrong I2C bus/address, or no power.\nHow to fix: Verify [sensor] i2c_bus and i2c_address and the sensor wiring."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config <FILE> pointing at a readable TOML. Original: {msg}"
        );
    }

    if lower.contains("parse config") {
        return format!(
            "What happened: The config file is not valid TOML for this monitor.\nLikely causes: Typo, wrong value type, or a stray section.\nHow to fix: Compare with etc/pmon.toml. Original: {msg}"
        );
    }

    if lower.contains("must be") || lower.contains("unreasonably large") {
        return format!(
            "What happened: Configuration is invalid or incomplete ({msg}).\nLikely causes: Missing device id, Wi-Fi SSID or endpoint URLs.\nHow to fix: Edit the TOML config or set the matching environment variable and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Short stable name for the error kind, used in JSON output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    use pmon_core::error::{BuildError, MonitorError};
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::ClockSync(_) => "ClockSync",
            MonitorError::RetriesExhausted { .. } => "RetriesExhausted",
            MonitorError::SensorUnavailable(_) => "SensorUnavailable",
            MonitorError::SensorRead(_) => "SensorRead",
            MonitorError::State(_) => "State",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    "Error"
}

/// Map typed monitor errors to stable exit codes; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use pmon_core::error::MonitorError;
    match err.downcast_ref::<MonitorError>() {
        Some(MonitorError::ClockSync(_)) => 3,
        Some(MonitorError::RetriesExhausted { .. }) => 4,
        Some(_) => 5,
        None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use pmon_core::error::MonitorError;
    use serde_json::json;

    let reason = reason_name(err);
    let message = humanize(err);
    let obj = match err.downcast_ref::<MonitorError>() {
        Some(MonitorError::ClockSync(cs)) => {
            json!({ "reason": reason, "details": { "cause": cs.to_string() }, "message": message })
        }
        Some(MonitorError::RetriesExhausted { stage, attempts }) => json!({
            "reason": reason,
            "details": { "stage": stage.label(), "attempts": attempts },
            "message": message,
        }),
        _ => json!({ "reason": reason, "message": message }),
    };
    obj.to_string()
}
