//! Measurement upload.

use serde::Serialize;

use crate::capabilities::{Reporter, Session};
use crate::error::PostError;
use crate::model::Measurement;

/// JSON body posted to the server. Keys follow the sensor register names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPayload<'a> {
    pub device_id: &'a str,
    pub pm10: u16,
    pub pm25: u16,
    pub pm100: u16,
}

impl<'a> MeasurementPayload<'a> {
    pub fn new(device_id: &'a str, m: &Measurement) -> Self {
        Self {
            device_id,
            pm10: m.pm10_standard,
            pm25: m.pm25_standard,
            pm100: m.pm100_standard,
        }
    }
}

/// Compact JSON for one measurement.
pub fn encode_payload(device_id: &str, m: &Measurement) -> Result<String, PostError> {
    serde_json::to_string(&MeasurementPayload::new(device_id, m))
        .map_err(|e| PostError::Encode(e.to_string()))
}

pub struct HttpReporter {
    device_id: String,
    post_url: String,
}

impl HttpReporter {
    pub fn new(device_id: impl Into<String>, post_url: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            post_url: post_url.into(),
        }
    }
}

impl Reporter for HttpReporter {
    fn post(&mut self, session: &mut Session, m: &Measurement) -> Result<(), PostError> {
        let body = encode_payload(&self.device_id, m)?;
        tracing::info!(url = %self.post_url, %body, "posting to server");
        let resp = session
            .client()
            .post(&self.post_url, "application/json", &body)
            .map_err(|e| PostError::Transport(e.to_string()))?;
        if !(200..300).contains(&resp.status) {
            return Err(PostError::Status(resp.status));
        }
        let parsed: serde_json::Value = serde_json::from_str(&resp.body)
            .map_err(|e| PostError::InvalidResponse(e.to_string()))?;
        tracing::info!(response = %parsed, "post accepted");
        Ok(())
    }
}
