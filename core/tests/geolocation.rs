//! Endpoint behavior over a recording fake transport.
//!
//! `Recorder` stands in for the network: it logs every request it is handed
//! and replies with a canned body or a canned error. A shared event log also
//! records position lookups, so tests can check what happened in which order.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geoloc_core::{
    ApiError, Coordinate, FixedPosition, Geolocation, HasStatus, HttpMethod, HttpRequest,
    NormalizeError, Payload, PositionError, PositionProvider, RoutingOptions, Status, Transport,
    TravelMode, Units,
};
use serde_json::json;

const INVALID_JSON: &str = r#""invalid_json": true}"#;
const LATITUDE: f64 = 40.7041895;
const LONGITUDE: f64 = -73.9867797;
const QUERY: &str = "20 Jay Street";

type Events = Arc<Mutex<Vec<String>>>;

/// Opaque transport failure, compared by value.
#[derive(Debug, Clone, PartialEq)]
struct HttpError(&'static str);

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl HasStatus for HttpError {
    fn status(&self) -> Status {
        Status::ErrorNetwork
    }
}

struct Recorder {
    reply: Result<String, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
    events: Events,
}

impl Recorder {
    fn replying(body: &str) -> Self {
        Self::new(Ok(body.to_string()), Events::default())
    }

    fn failing(error: HttpError) -> Self {
        Self::new(Err(error), Events::default())
    }

    fn new(reply: Result<String, HttpError>, events: Events) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
            events,
        }
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Recorder {
    type Error = HttpError;

    async fn request(&self, request: &HttpRequest) -> Result<String, HttpError> {
        self.events.lock().unwrap().push(format!("request {}", request.path));
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

struct LoggedPosition {
    at: Coordinate,
    events: Events,
}

#[async_trait]
impl PositionProvider for LoggedPosition {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        self.events.lock().unwrap().push("position".to_string());
        Ok(self.at)
    }
}

fn here() -> Coordinate {
    Coordinate::new(LATITUDE, LONGITUDE)
}

// ---------------------------------------------------------------------------
// geocode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn geocode_server_error_on_invalid_json() {
    let transport = Recorder::replying(INVALID_JSON);
    let err = Geolocation::new(&transport).geocode(QUERY).await.unwrap_err();
    assert!(matches!(err, ApiError::Server(NormalizeError::Malformed(_))));
    assert_eq!(err.status(), Status::ErrorServer);
}

#[tokio::test]
async fn geocode_returns_transport_error_unchanged() {
    let transport = Recorder::failing(HttpError("http error"));
    let err = Geolocation::new(&transport).geocode(QUERY).await.unwrap_err();
    assert_eq!(err.into_transport(), Some(HttpError("http error")));
}

#[tokio::test]
async fn geocode_succeeds() {
    let transport = Recorder::replying(
        r#"{"addresses":[{"formattedAddress":"20 Jay St, Brooklyn, NY 11201 USA"}]}"#,
    );
    let addresses = Geolocation::new(&transport)
        .geocode(QUERY)
        .await
        .unwrap()
        .into_record()
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].path, "v1/geocode/forward");
    assert_eq!(requests[0].params, vec![("query".to_string(), QUERY.to_string())]);

    assert_eq!(addresses.len(), 1);
    assert_eq!(
        addresses[0].formatted_address.as_deref(),
        Some("20 Jay St, Brooklyn, NY 11201 USA")
    );
}

// ---------------------------------------------------------------------------
// reverseGeocodeLocation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reverse_geocode_location_server_error_on_invalid_json() {
    let transport = Recorder::replying(INVALID_JSON);
    let err = Geolocation::new(&transport)
        .reverse_geocode_location(here())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Status::ErrorServer);
}

#[tokio::test]
async fn reverse_geocode_location_returns_transport_error_unchanged() {
    let transport = Recorder::failing(HttpError("http error"));
    let err = Geolocation::new(&transport)
        .reverse_geocode_location(here())
        .await
        .unwrap_err();
    assert_eq!(err.transport(), Some(&HttpError("http error")));
}

#[tokio::test]
async fn reverse_geocode_location_succeeds() {
    let transport = Recorder::replying(r#"{"addresses":[{"street":"Jay St"}]}"#);
    let addresses = Geolocation::new(&transport)
        .reverse_geocode_location(here())
        .await
        .unwrap()
        .into_record()
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].path, "v1/geocode/reverse");
    assert_eq!(
        requests[0].params,
        vec![("coordinates".to_string(), format!("{LATITUDE},{LONGITUDE}"))]
    );
    assert_eq!(addresses[0].street.as_deref(), Some("Jay St"));
}

// ---------------------------------------------------------------------------
// ipGeocode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ip_geocode_server_error_on_invalid_json() {
    let transport = Recorder::replying(INVALID_JSON);
    let err = Geolocation::new(&transport).ip_geocode().await.unwrap_err();
    assert_eq!(err.status(), Status::ErrorServer);
}

#[tokio::test]
async fn ip_geocode_returns_transport_error_unchanged() {
    let transport = Recorder::failing(HttpError("http error"));
    let err = Geolocation::new(&transport).ip_geocode().await.unwrap_err();
    assert_eq!(err.into_transport(), Some(HttpError("http error")));
}

#[tokio::test]
async fn ip_geocode_succeeds() {
    let transport = Recorder::replying(r#"{"country":{"code":"US","name":"United States"}}"#);
    let country = Geolocation::new(&transport)
        .ip_geocode()
        .await
        .unwrap()
        .into_record()
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].path, "v1/geocode/ip");
    assert!(requests[0].params.is_empty());
    assert_eq!(country.code.as_deref(), Some("US"));
}

#[tokio::test]
async fn geocode_returns_unrecognized_addresses_verbatim() {
    let transport = Recorder::replying(r#"{"addresses":["matching-addresses"]}"#);
    let addresses = Geolocation::new(&transport).geocode(QUERY).await.unwrap();
    assert_eq!(addresses, Payload::Raw(json!(["matching-addresses"])));
}

#[tokio::test]
async fn ip_geocode_returns_plain_string_country_verbatim() {
    let transport = Recorder::replying(r#"{"country":"matching-country"}"#);
    let country = Geolocation::new(&transport).ip_geocode().await.unwrap();
    assert_eq!(country, Payload::Raw(json!("matching-country")));
}

#[tokio::test]
async fn valid_json_without_expected_field_is_a_server_error() {
    let transport = Recorder::replying(r#"{"meta":{"code":200}}"#);
    let err = Geolocation::new(&transport).ip_geocode().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Server(NormalizeError::UnexpectedShape { field: "country", .. })
    ));
}

// ---------------------------------------------------------------------------
// getDistanceToDestination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn distance_without_origin_looks_up_position_first() {
    let events = Events::default();
    let transport = Recorder::new(Ok(r#"{"routes":{}}"#.to_string()), events.clone());
    let position = LoggedPosition {
        at: here(),
        events: events.clone(),
    };
    let geo = Geolocation::with_position(&transport, position);

    geo.get_distance_to_destination(&RoutingOptions::default())
        .await
        .unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec!["position".to_string(), "request v1/route/distance".to_string()]
    );
    let requests = transport.requests();
    assert_eq!(requests[0].param_value("origin"), Some("40.7041895,-73.9867797"));
}

#[tokio::test]
async fn distance_with_origin_skips_position_lookup() {
    let events = Events::default();
    let transport = Recorder::new(Ok(r#"{"routes":{}}"#.to_string()), events.clone());
    let position = LoggedPosition {
        at: here(),
        events: events.clone(),
    };
    let geo = Geolocation::with_position(&transport, position);
    let options = RoutingOptions {
        origin: Some(Coordinate::new(1.0, 2.0)),
        destination: Some(Coordinate::new(3.0, 4.0)),
        modes: Some(vec![TravelMode::Bike, TravelMode::Foot]),
        units: Some(Units::Metric),
    };

    geo.get_distance_to_destination(&options).await.unwrap();

    assert_eq!(*events.lock().unwrap(), vec!["request v1/route/distance".to_string()]);
    let requests = transport.requests();
    let req = &requests[0];
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(
        req.params,
        vec![
            ("origin".to_string(), "1,2".to_string()),
            ("destination".to_string(), "3,4".to_string()),
            ("modes".to_string(), "bike,foot".to_string()),
            ("units".to_string(), "metric".to_string()),
        ]
    );
}

#[tokio::test]
async fn distance_returns_routes() {
    let transport = Recorder::replying(
        r#"{"routes":{"geodesic":{"distance":{"value":5.5,"text":"5.5 mi"}}}}"#,
    );
    let geo = Geolocation::with_position(&transport, FixedPosition(here()));
    let routes = geo
        .get_distance_to_destination(&RoutingOptions::default())
        .await
        .unwrap()
        .into_record()
        .unwrap();
    let geodesic = routes.geodesic.unwrap().distance.unwrap();
    assert_eq!(geodesic.text, "5.5 mi");
}

#[tokio::test]
async fn distance_server_error_on_invalid_json() {
    let transport = Recorder::replying(INVALID_JSON);
    let geo = Geolocation::with_position(&transport, FixedPosition(here()));
    let err = geo
        .get_distance_to_destination(&RoutingOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Server(NormalizeError::Malformed(_))));
    assert_eq!(err.status(), Status::ErrorServer);
}

#[tokio::test]
async fn distance_transport_error_is_distinct_from_server_error() {
    let transport = Recorder::failing(HttpError("ERROR_SERVER"));
    let geo = Geolocation::with_position(&transport, FixedPosition(here()));
    let err = geo
        .get_distance_to_destination(&RoutingOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(HttpError("ERROR_SERVER"))));
    assert!(!matches!(err, ApiError::Server(_)));
}

// ---------------------------------------------------------------------------
// concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let transport = Recorder::replying(r#"{"addresses":[],"country":{"code":"US"}}"#);
    let geo = Geolocation::new(&transport);

    let (a, b, c) = tokio::join!(geo.geocode("a"), geo.geocode("b"), geo.ip_geocode());
    assert_eq!(a.unwrap().record().map(Vec::len), Some(0));
    assert_eq!(b.unwrap().record().map(Vec::len), Some(0));
    assert_eq!(c.unwrap().into_record().unwrap().code.as_deref(), Some("US"));
    assert_eq!(transport.requests().len(), 3);
}

// ---------------------------------------------------------------------------
// logging
// ---------------------------------------------------------------------------

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test(flavor = "current_thread")]
async fn transport_failure_is_logged_with_its_error() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let transport = Recorder::failing(HttpError("http error"));
    Geolocation::new(&transport).ip_geocode().await.unwrap_err();

    let logs = capture.contents();
    assert!(logs.contains("Transport failed"), "{logs}");
    assert!(logs.contains("http error"), "{logs}");
}
