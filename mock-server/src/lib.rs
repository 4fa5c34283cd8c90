use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::debug;

/// Forward-geocoding this query returns a truncated body.
pub const MALFORMED_QUERY: &str = "__malformed__";

const EARTH_RADIUS_M: f64 = 6_371_008.8;
/// Road distance relative to the straight line.
const DETOUR_FACTOR: f64 = 1.3;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub state_code: String,
    pub postal_code: String,
    pub country: String,
    pub country_code: String,
    pub country_flag: String,
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub flag: String,
}

#[derive(Debug)]
pub struct Fixtures {
    pub addresses: Vec<Address>,
    pub country: Country,
}

pub type Db = Arc<Fixtures>;

#[allow(clippy::too_many_arguments)]
fn us_address(
    latitude: f64,
    longitude: f64,
    number: &str,
    street: &str,
    city: &str,
    state: &str,
    state_code: &str,
    postal_code: &str,
) -> Address {
    Address {
        latitude,
        longitude,
        formatted_address: format!("{number} {street}, {city}, {state_code} {postal_code} USA"),
        number: number.to_string(),
        street: street.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        state_code: state_code.to_string(),
        postal_code: postal_code.to_string(),
        country: "United States".to_string(),
        country_code: "US".to_string(),
        country_flag: "🇺🇸".to_string(),
        layer: "address".to_string(),
        distance: None,
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Self {
            addresses: vec![
                us_address(40.7041895, -73.9867797, "20", "Jay St", "Brooklyn", "New York", "NY", "11201"),
                us_address(40.78382, -73.97536, "200", "Central Park W", "New York", "New York", "NY", "10024"),
                us_address(37.4224764, -122.0842499, "1600", "Amphitheatre Pkwy", "Mountain View", "California", "CA", "94043"),
                us_address(37.3349, -122.00902, "1", "Apple Park Way", "Cupertino", "California", "CA", "95014"),
            ],
            country: Country {
                code: "US".to_string(),
                name: "United States".to_string(),
                flag: "🇺🇸".to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
pub struct ForwardParams {
    pub query: Option<String>,
}

#[derive(Deserialize)]
pub struct ReverseParams {
    pub coordinates: Option<String>,
}

#[derive(Deserialize)]
pub struct DistanceParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub modes: Option<String>,
    pub units: Option<String>,
}

pub fn app() -> Router {
    let db: Db = Arc::new(Fixtures::default());
    Router::new()
        .route("/v1/geocode/forward", get(forward_geocode))
        .route("/v1/geocode/reverse", get(reverse_geocode))
        .route("/v1/geocode/ip", get(ip_geocode))
        .route("/v1/route/distance", get(route_distance))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn failure(status: StatusCode, message: &str) -> Response {
    let body = json!({ "meta": { "code": status.as_u16(), "message": message } });
    (status, Json(body)).into_response()
}

fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    match headers.get(AUTHORIZATION) {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err(failure(StatusCode::UNAUTHORIZED, "missing publishable key")),
    }
}

fn success(field: &str, payload: serde_json::Value) -> Response {
    let mut body = json!({ "meta": { "code": 200 } });
    body[field] = payload;
    Json(body).into_response()
}

pub fn parse_coordinate(s: &str) -> Option<(f64, f64)> {
    let (lat, lon) = s.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    let in_range = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
    in_range.then_some((lat, lon))
}

/// Great-circle distance in meters.
pub fn haversine_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let a = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

async fn forward_geocode(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<ForwardParams>,
) -> Response {
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    let query = params.query.unwrap_or_default();
    debug!(%query, "forward geocode");

    if query == MALFORMED_QUERY {
        return (StatusCode::OK, r#"{"meta":{"code":200},"addresses":[{"#).into_response();
    }

    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "query is required");
    }
    let matches: Vec<&Address> = db
        .addresses
        .iter()
        .filter(|a| a.formatted_address.to_lowercase().contains(&needle))
        .collect();
    success("addresses", json!(matches))
}

async fn reverse_geocode(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<ReverseParams>,
) -> Response {
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    let Some(point) = params.coordinates.as_deref().and_then(parse_coordinate) else {
        return failure(StatusCode::BAD_REQUEST, "invalid coordinates");
    };
    debug!(?point, "reverse geocode");

    let nearest = db
        .addresses
        .iter()
        .map(|a| (haversine_m(point, (a.latitude, a.longitude)), a))
        .min_by(|x, y| x.0.total_cmp(&y.0))
        .map(|(distance, a)| Address {
            distance: Some(distance.round()),
            ..a.clone()
        });
    success("addresses", json!(nearest.into_iter().collect::<Vec<_>>()))
}

async fn ip_geocode(State(db): State<Db>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    success("country", json!(db.country))
}

/// Meters per second for each supported travel mode.
fn speed_mps(mode: &str) -> Option<f64> {
    match mode {
        "foot" => Some(1.4),
        "bike" => Some(4.5),
        "car" => Some(11.0),
        "truck" => Some(9.0),
        "motorbike" => Some(12.0),
        _ => None,
    }
}

fn distance_measure(meters: f64, units: &str) -> serde_json::Value {
    if units == "metric" {
        json!({ "value": meters.round(), "text": format!("{:.1} km", meters / 1000.0) })
    } else {
        let feet = meters * 3.28084;
        json!({ "value": feet.round(), "text": format!("{:.1} mi", meters / 1609.344) })
    }
}

fn duration_measure(seconds: f64) -> serde_json::Value {
    let minutes = seconds / 60.0;
    json!({ "value": (minutes * 10.0).round() / 10.0, "text": format!("{} mins", minutes.round()) })
}

async fn route_distance(headers: HeaderMap, Query(params): Query<DistanceParams>) -> Response {
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    let (Some(origin), Some(destination)) = (
        params.origin.as_deref().and_then(parse_coordinate),
        params.destination.as_deref().and_then(parse_coordinate),
    ) else {
        return failure(StatusCode::BAD_REQUEST, "origin and destination are required");
    };
    let units = params.units.as_deref().unwrap_or("imperial");
    if units != "imperial" && units != "metric" {
        return failure(StatusCode::BAD_REQUEST, "invalid units");
    }
    let modes = params.modes.as_deref().unwrap_or("car");

    let geodesic = haversine_m(origin, destination);
    let mut routes = json!({ "geodesic": { "distance": distance_measure(geodesic, units) } });
    for mode in modes.split(',').map(str::trim).filter(|m| !m.is_empty()) {
        let Some(speed) = speed_mps(mode) else {
            return failure(StatusCode::BAD_REQUEST, &format!("invalid mode: {mode}"));
        };
        let road = geodesic * DETOUR_FACTOR;
        routes[mode] = json!({
            "distance": distance_measure(road, units),
            "duration": duration_measure(road / speed),
        });
    }
    debug!(?origin, ?destination, %modes, %units, "route distance");
    success("routes", routes)
}
