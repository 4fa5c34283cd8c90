//! Stateless request builder and response parser for the geolocation API.
//!
//! # Design
//! `GeoClient` carries no state between calls. Each endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that normalizes the raw body. The caller executes the HTTP round-trip
//! in between, so this layer is deterministic and free of I/O. `Geolocation`
//! drives the same methods through a `Transport`.
//!
//! Parsers return a `Payload`: the typed record when the field matches its
//! documented shape, otherwise the field's raw JSON.
//!
//! No input validation happens here: a missing destination or an empty query
//! is sent as-is and the server decides.

use crate::error::NormalizeError;
use crate::http::HttpRequest;
use crate::normalize::extract;
use crate::types::{Address, Coordinate, Country, Payload, Routes, RoutingOptions};

pub const FORWARD_GEOCODE_PATH: &str = "v1/geocode/forward";
pub const REVERSE_GEOCODE_PATH: &str = "v1/geocode/reverse";
pub const IP_GEOCODE_PATH: &str = "v1/geocode/ip";
pub const DISTANCE_PATH: &str = "v1/route/distance";

/// Synchronous, stateless client for the geolocation API.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoClient;

impl GeoClient {
    pub fn new() -> Self {
        Self
    }

    pub fn build_geocode(&self, query: &str) -> HttpRequest {
        HttpRequest::get(FORWARD_GEOCODE_PATH).param("query", Some(query.to_string()))
    }

    pub fn build_reverse_geocode(&self, coordinate: Coordinate) -> HttpRequest {
        HttpRequest::get(REVERSE_GEOCODE_PATH).param("coordinates", Some(coordinate.to_string()))
    }

    pub fn build_ip_geocode(&self) -> HttpRequest {
        HttpRequest::get(IP_GEOCODE_PATH)
    }

    /// Build the distance request. `origin` takes precedence over
    /// `options.origin`; `Geolocation` passes the resolved device position
    /// here when the caller left it out.
    pub fn build_distance(&self, origin: Option<Coordinate>, options: &RoutingOptions) -> HttpRequest {
        let origin = origin.or(options.origin);
        let modes = options.modes.as_ref().map(|modes| {
            modes
                .iter()
                .map(|mode| mode.as_str())
                .collect::<Vec<_>>()
                .join(",")
        });

        HttpRequest::get(DISTANCE_PATH)
            .param("origin", origin.map(|c| c.to_string()))
            .param("destination", options.destination.map(|c| c.to_string()))
            .param("modes", modes)
            .param("units", options.units.map(|u| u.as_str().to_string()))
    }

    pub fn parse_geocode(&self, body: &str) -> Result<Payload<Vec<Address>>, NormalizeError> {
        extract(body, "addresses")
    }

    pub fn parse_reverse_geocode(
        &self,
        body: &str,
    ) -> Result<Payload<Vec<Address>>, NormalizeError> {
        extract(body, "addresses")
    }

    pub fn parse_ip_geocode(&self, body: &str) -> Result<Payload<Country>, NormalizeError> {
        extract(body, "country")
    }

    pub fn parse_distance(&self, body: &str) -> Result<Payload<Routes>, NormalizeError> {
        extract(body, "routes")
    }
}
