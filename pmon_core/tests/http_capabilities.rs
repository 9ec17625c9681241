use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use pmon_core::error::{ClockSyncError, PostError};
use pmon_core::{
    ClockSync, ConnectivityGate, EndpointCfg, HttpClockSync, HttpGate, HttpReporter, Measurement,
    Reporter, Session, WifiCfg, encode_payload,
};
use pmon_traits::{BoxError, HttpClient, HttpResponse, RealTimeClock, UtcDateTime, WifiRadio};
use rstest::rstest;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Request {
    method: &'static str,
    url: String,
    content_type: Option<String>,
    body: Option<String>,
}

/// Client that answers from a URL table; unknown URLs are transport errors.
#[derive(Clone, Default)]
struct TableClient {
    routes: HashMap<String, HttpResponse>,
    seen: Arc<Mutex<Vec<Request>>>,
}

impl TableClient {
    fn route(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(url.to_string(), HttpResponse::new(status, body));
        self
    }

    fn answer(&self, url: &str) -> Result<HttpResponse, BoxError> {
        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| format!("connection refused: {url}").into())
    }
}

impl HttpClient for TableClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, BoxError> {
        self.seen.lock().unwrap().push(Request {
            method: "GET",
            url: url.to_string(),
            content_type: None,
            body: None,
        });
        self.answer(url)
    }

    fn post(&mut self, url: &str, content_type: &str, body: &str) -> Result<HttpResponse, BoxError> {
        self.seen.lock().unwrap().push(Request {
            method: "POST",
            url: url.to_string(),
            content_type: Some(content_type.to_string()),
            body: Some(body.to_string()),
        });
        self.answer(url)
    }
}

struct Radio {
    client: TableClient,
    join_ok: bool,
    joined: Arc<Mutex<Option<(String, String)>>>,
}

impl WifiRadio for Radio {
    fn open_client(&mut self) -> Result<Box<dyn HttpClient>, BoxError> {
        Ok(Box::new(self.client.clone()))
    }
    fn rssi(&self) -> Option<i32> {
        Some(-61)
    }
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), BoxError> {
        if !self.join_ok {
            return Err("auth failed".into());
        }
        *self.joined.lock().unwrap() = Some((ssid.to_string(), password.to_string()));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Rtc {
    set: Arc<Mutex<Option<UtcDateTime>>>,
}

impl RealTimeClock for Rtc {
    fn set_utc(&mut self, t: UtcDateTime) -> Result<(), BoxError> {
        *self.set.lock().unwrap() = Some(t);
        Ok(())
    }
}

const INTERNET: &str = "http://connectivity.example/generate_200";
const SERVER_TEST: &str = "http://pm.example/ping";
const SERVER_POST: &str = "http://pm.example/measurements";
const TIME: &str = "http://time.example/utc";

fn endpoints() -> EndpointCfg {
    EndpointCfg {
        internet_test_url: INTERNET.into(),
        server_test_url: SERVER_TEST.into(),
        server_expected_response: "pong".into(),
        server_post_url: SERVER_POST.into(),
        time_url: TIME.into(),
    }
}

fn wifi() -> WifiCfg {
    WifiCfg {
        ssid: "lab".into(),
        password: "hunter2".into(),
    }
}

fn gate(client: TableClient) -> HttpGate {
    HttpGate::new(
        Box::new(Radio {
            client,
            join_ok: true,
            joined: Arc::default(),
        }),
        wifi(),
        endpoints(),
    )
}

fn session(client: &TableClient) -> Session {
    Session::new(Box::new(client.clone()))
}

fn measurement() -> Measurement {
    Measurement {
        pm10_standard: 3,
        pm25_standard: 7,
        pm100_standard: 15,
        captured_at: Instant::now(),
    }
}

#[test]
fn wifi_join_uses_configured_credentials() {
    let joined = Arc::new(Mutex::new(None));
    let mut g = HttpGate::new(
        Box::new(Radio {
            client: TableClient::default(),
            join_ok: true,
            joined: joined.clone(),
        }),
        wifi(),
        endpoints(),
    );
    assert!(g.connect_wifi().is_some());
    assert_eq!(
        *joined.lock().unwrap(),
        Some(("lab".to_string(), "hunter2".to_string()))
    );
}

#[test]
fn wifi_join_failure_yields_no_session() {
    let mut g = HttpGate::new(
        Box::new(Radio {
            client: TableClient::default(),
            join_ok: false,
            joined: Arc::default(),
        }),
        wifi(),
        endpoints(),
    );
    assert!(g.connect_wifi().is_none());
}

#[rstest]
#[case::ok(Some(200), true)]
#[case::no_content(Some(204), false)]
#[case::redirect(Some(302), false)]
#[case::unreachable(None, false)]
fn internet_requires_exactly_200(#[case] status: Option<u16>, #[case] reachable: bool) {
    let client = match status {
        Some(s) => TableClient::default().route(INTERNET, s, ""),
        None => TableClient::default(),
    };
    let mut g = gate(client.clone());
    assert_eq!(g.test_internet(&mut session(&client)), reachable);
    // Single attempt, no retry.
    assert_eq!(client.seen.lock().unwrap().len(), 1);
}

#[rstest]
#[case::exact("pong", true)]
#[case::trailing_newline("pong\n", false)]
#[case::different_case("PONG", false)]
#[case::empty("", false)]
fn server_requires_exact_body(#[case] body: &str, #[case] available: bool) {
    let client = TableClient::default().route(SERVER_TEST, 200, body);
    let mut g = gate(client.clone());
    assert_eq!(g.test_server(&mut session(&client)), available);
}

#[test]
fn server_check_ignores_status_code() {
    let client = TableClient::default().route(SERVER_TEST, 503, "pong");
    let mut g = gate(client.clone());
    assert!(g.test_server(&mut session(&client)));
}

#[test]
fn payload_has_exact_keys_and_values() {
    let body = encode_payload("esp32-lab-01", &measurement()).unwrap();
    assert_eq!(
        body,
        r#"{"deviceId":"esp32-lab-01","pm10":3,"pm25":7,"pm100":15}"#
    );
}

#[test]
fn reporter_posts_json_to_configured_url() {
    let client = TableClient::default().route(SERVER_POST, 201, r#"{"ok":true}"#);
    let mut r = HttpReporter::new("esp32-lab-01", SERVER_POST);
    r.post(&mut session(&client), &measurement()).unwrap();

    let seen = client.seen.lock().unwrap();
    assert_eq!(
        seen.as_slice(),
        &[Request {
            method: "POST",
            url: SERVER_POST.into(),
            content_type: Some("application/json".into()),
            body: Some(r#"{"deviceId":"esp32-lab-01","pm10":3,"pm25":7,"pm100":15}"#.into()),
        }]
    );
}

#[rstest]
#[case::server_error(TableClient::default().route(SERVER_POST, 500, "{}"), PostError::Status(500))]
#[case::transport(TableClient::default(), PostError::Transport(format!("connection refused: {SERVER_POST}")))]
fn reporter_failures_are_typed(#[case] client: TableClient, #[case] expected: PostError) {
    let mut r = HttpReporter::new("dev", SERVER_POST);
    assert_eq!(r.post(&mut session(&client), &measurement()), Err(expected));
}

#[test]
fn reporter_rejects_non_json_response() {
    let client = TableClient::default().route(SERVER_POST, 200, "<html>ok</html>");
    let mut r = HttpReporter::new("dev", SERVER_POST);
    assert!(matches!(
        r.post(&mut session(&client), &measurement()),
        Err(PostError::InvalidResponse(_))
    ));
}

#[test]
fn clock_sync_programs_rtc() {
    let client = TableClient::default().route(
        TIME,
        200,
        r#"{"year":2025,"month":12,"day":31,"hour":23,"minute":59,"seconds":58,"timeZone":"UTC"}"#,
    );
    let rtc = Rtc::default();
    let mut sync = HttpClockSync::new(TIME, Box::new(rtc.clone()));
    let utc = sync.sync(&mut session(&client)).unwrap();
    assert_eq!(utc.to_string(), "2025-12-31 23:59:58");
    assert_eq!(
        *rtc.set.lock().unwrap(),
        Some(UtcDateTime {
            year: 2025,
            month: 12,
            day: 31,
            hour: 23,
            minute: 59,
            second: 58,
        })
    );
}

#[test]
fn clock_sync_reports_http_status() {
    let client = TableClient::default().route(TIME, 503, "busy");
    let rtc = Rtc::default();
    let mut sync = HttpClockSync::new(TIME, Box::new(rtc.clone()));
    assert_eq!(
        sync.sync(&mut session(&client)),
        Err(ClockSyncError::Status(503))
    );
    assert!(rtc.set.lock().unwrap().is_none());
}
