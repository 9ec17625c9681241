//! Program the board RTC from a JSON UTC time service.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use pmon_traits::{RealTimeClock, UtcDateTime};
use serde::Deserialize;

use crate::capabilities::{ClockSync, Session};
use crate::error::ClockSyncError;

/// Fields read from the time service; anything else in the body is ignored.
#[derive(Debug, Deserialize)]
struct TimeResponse {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    seconds: u32,
}

/// Parse and range-check a time service body.
pub fn parse_time_response(body: &str) -> Result<NaiveDateTime, ClockSyncError> {
    let t: TimeResponse = serde_json::from_str(body)
        .map_err(|e| ClockSyncError::InvalidResponse(e.to_string()))?;
    NaiveDate::from_ymd_opt(t.year, t.month, t.day)
        .and_then(|d| d.and_hms_opt(t.hour, t.minute, t.seconds))
        .ok_or_else(|| {
            ClockSyncError::InvalidTime(format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                t.year, t.month, t.day, t.hour, t.minute, t.seconds
            ))
        })
}

fn to_rtc(dt: &NaiveDateTime) -> UtcDateTime {
    // chrono guarantees these ranges, so the narrowing casts are lossless.
    UtcDateTime {
        year: dt.year(),
        month: dt.month() as u8,
        day: dt.day() as u8,
        hour: dt.hour() as u8,
        minute: dt.minute() as u8,
        second: dt.second() as u8,
    }
}

pub struct HttpClockSync {
    url: String,
    rtc: Box<dyn RealTimeClock>,
}

impl HttpClockSync {
    pub fn new(url: impl Into<String>, rtc: Box<dyn RealTimeClock>) -> Self {
        Self {
            url: url.into(),
            rtc,
        }
    }
}

impl ClockSync for HttpClockSync {
    fn sync(&mut self, session: &mut Session) -> Result<NaiveDateTime, ClockSyncError> {
        tracing::info!(url = %self.url, "retrieving time");
        let resp = session
            .client()
            .get(&self.url)
            .map_err(|e| ClockSyncError::Transport(e.to_string()))?;
        if !(200..300).contains(&resp.status) {
            return Err(ClockSyncError::Status(resp.status));
        }
        let utc = parse_time_response(&resp.body)?;
        self.rtc
            .set_utc(to_rtc(&utc))
            .map_err(|e| ClockSyncError::Rtc(e.to_string()))?;
        tracing::info!(%utc, "board time set to UTC");
        Ok(utc)
    }
}
