//! Measurement, mode and loop counters.

use std::fmt;
use std::time::Instant;

use pmon_traits::PmReading;

/// One particulate reading, stamped when the sensor returned it.
///
/// Field names follow the sensor registers: `pm10_standard` is PM1.0,
/// `pm25_standard` is PM2.5, `pm100_standard` is PM10 (µg/m³).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub pm10_standard: u16,
    pub pm25_standard: u16,
    pub pm100_standard: u16,
    pub captured_at: Instant,
}

impl Measurement {
    pub fn from_reading(r: PmReading, captured_at: Instant) -> Self {
        Self {
            pm10_standard: r.pm10_standard,
            pm25_standard: r.pm25_standard,
            pm100_standard: r.pm100_standard,
            captured_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Online,
    Offline,
}

impl Mode {
    #[inline]
    pub fn is_online(self) -> bool {
        matches!(self, Mode::Online)
    }
}

/// Step of startup or of the loop, as named on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SensorInit,
    SensorReading,
    Wifi,
    Internet,
    Server,
    PostingToServer,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::SensorInit => "Sensor init",
            Stage::SensorReading => "Sensor reading",
            Stage::Wifi => "Wi-Fi",
            Stage::Internet => "Internet",
            Stage::Server => "Server",
            Stage::PostingToServer => "Posting to server",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a failed post leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFailure {
    /// Still online; `streak` consecutive failures so far.
    Retry { streak: u32 },
    /// Streak exhausted; now offline for good.
    Downgrade,
}

/// Mode plus the two loop counters. Owned by the monitor; volatile.
///
/// - `reads_since_post` counts display iterations since the last post
///   attempt and is reset by the attempt itself, not by its outcome.
/// - `post_failure_streak` counts consecutive failed posts and is reset by a
///   success or by the downgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopState {
    mode: Mode,
    reads_since_post: u32,
    post_failure_streak: u32,
}

impl LoopState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            reads_since_post: 0,
            post_failure_streak: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn reads_since_post(&self) -> u32 {
        self.reads_since_post
    }

    pub fn post_failure_streak(&self) -> u32 {
        self.post_failure_streak
    }

    /// Posting is due only while online and exactly at the cycle boundary.
    #[inline]
    pub fn post_due(&self, reads_before_post: u32) -> bool {
        self.mode.is_online() && self.reads_since_post == reads_before_post
    }

    /// Start a post attempt. The cycle restarts whatever the outcome.
    pub fn begin_post(&mut self) {
        self.reads_since_post = 0;
    }

    pub fn post_succeeded(&mut self) {
        self.post_failure_streak = 0;
    }

    pub fn post_failed(&mut self, retries_before_offline: u32) -> PostFailure {
        if self.post_failure_streak >= retries_before_offline {
            self.mode = Mode::Offline;
            self.post_failure_streak = 0;
            PostFailure::Downgrade
        } else {
            self.post_failure_streak += 1;
            PostFailure::Retry {
                streak: self.post_failure_streak,
            }
        }
    }

    /// Count an iteration that reached the display.
    pub fn record_read(&mut self) {
        self.reads_since_post = self.reads_since_post.saturating_add(1);
    }
}
