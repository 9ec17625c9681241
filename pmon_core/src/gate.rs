//! HTTP-backed connectivity checks: Wi-Fi, then internet, then server.

use pmon_traits::WifiRadio;

use crate::capabilities::{ConnectivityGate, Session};
use crate::config::{EndpointCfg, WifiCfg};
use crate::error::GateError;

pub struct HttpGate {
    radio: Box<dyn WifiRadio>,
    wifi: WifiCfg,
    endpoints: EndpointCfg,
}

impl HttpGate {
    pub fn new(radio: Box<dyn WifiRadio>, wifi: WifiCfg, endpoints: EndpointCfg) -> Self {
        Self {
            radio,
            wifi,
            endpoints,
        }
    }

    pub fn try_connect(&mut self) -> Result<Session, GateError> {
        tracing::info!(ssid = %self.wifi.ssid, "searching for wi-fi");
        let client = self
            .radio
            .open_client()
            .map_err(|e| GateError::WifiConnect(e.to_string()))?;
        if let Some(rssi) = self.radio.rssi() {
            tracing::info!(rssi, "signal strength");
        }
        tracing::info!(ssid = %self.wifi.ssid, "connecting");
        self.radio
            .connect(&self.wifi.ssid, &self.wifi.password)
            .map_err(|e| GateError::WifiConnect(e.to_string()))?;
        tracing::info!("connected to wi-fi");
        Ok(Session::new(client))
    }

    /// One GET; reachable iff the answer is exactly HTTP 200.
    pub fn check_internet(&self, session: &mut Session) -> Result<(), GateError> {
        let url = &self.endpoints.internet_test_url;
        tracing::info!(%url, "testing internet connection");
        let resp = session
            .client()
            .get(url)
            .map_err(|e| GateError::InternetUnreachable(e.to_string()))?;
        if resp.status == 200 {
            Ok(())
        } else {
            Err(GateError::InternetUnreachable(format!(
                "GET returned HTTP {}",
                resp.status
            )))
        }
    }

    /// One GET; available iff the body equals the expected text exactly.
    pub fn check_server(&self, session: &mut Session) -> Result<(), GateError> {
        let url = &self.endpoints.server_test_url;
        let expected = &self.endpoints.server_expected_response;
        tracing::info!(%url, "testing server availability");
        let resp = session
            .client()
            .get(url)
            .map_err(|e| GateError::ServerUnreachable(e.to_string()))?;
        if resp.body == *expected {
            Ok(())
        } else {
            Err(GateError::ServerUnreachable(format!(
                "expected {expected:?}, got {:?}",
                resp.body
            )))
        }
    }
}

impl ConnectivityGate for HttpGate {
    fn connect_wifi(&mut self) -> Option<Session> {
        match self.try_connect() {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(error = %e, "wi-fi connection failed");
                None
            }
        }
    }

    fn test_internet(&mut self, session: &mut Session) -> bool {
        match self.check_internet(session) {
            Ok(()) => {
                tracing::info!("internet reachable");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "internet test failed");
                false
            }
        }
    }

    fn test_server(&mut self, session: &mut Session) -> bool {
        match self.check_server(session) {
            Ok(()) => {
                tracing::info!("server returned expected response");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "server test failed");
                false
            }
        }
    }
}
