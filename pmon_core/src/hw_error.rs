//! Maps `Box<dyn Error>` from trait boundaries to a typed `SensorFault`.
//!
//! The traits in `pmon_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed fault enum, with an
//! optional feature-gated path for `pmon_hardware::HwError` downcasting.

use crate::error::SensorFault;

/// Classify a trait-boundary sensor error.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> SensorFault {
    #[cfg(feature = "hardware-errors")]
    {
        use pmon_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout => SensorFault::Timeout,
                HwError::Frame(f) => SensorFault::Frame(f.to_string()),
                other => SensorFault::Bus(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        SensorFault::Timeout
    } else if lower.contains("checksum") || lower.contains("frame") {
        SensorFault::Frame(s)
    } else {
        SensorFault::Bus(s)
    }
}
