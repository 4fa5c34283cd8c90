//! Client core for the geolocation API: forward, reverse and IP geocoding,
//! plus route distance.
//!
//! # Overview
//! Two layers share one set of request builders and one response
//! normalizer:
//!
//! - `GeoClient` builds `HttpRequest` values and parses raw bodies without
//!   touching the network (host-does-IO pattern). A host that performs its
//!   own HTTP calls uses it directly.
//! - `Geolocation` drives the same builders through a `Transport` and a
//!   `PositionProvider`, exposing every endpoint as an `async fn` that
//!   settles with `Result<Payload<_>, ApiError<Transport::Error>>`.
//!
//! # Design
//! - Normalization happens once: a body that is not valid JSON, or lacks the
//!   field the endpoint expects, becomes `ApiError::Server`. A present field
//!   in an unexpected shape is returned as `Payload::Raw`.
//! - Transport errors reach the caller unchanged in `ApiError::Transport`.
//! - Nothing is retried, cached or validated on the way out.
//! - `HttpTransport` is the reqwest-backed default transport.

pub mod client;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod http;
pub mod http_transport;
pub mod normalize;
pub mod position;
pub mod transport;
pub mod types;

pub use client::GeoClient;
pub use config::ClientConfig;
pub use error::{ApiError, HasStatus, NormalizeError, PositionError, Status};
pub use geolocation::Geolocation;
pub use http::{HttpMethod, HttpRequest};
pub use http_transport::{HttpTransport, TransportError};
pub use normalize::normalize;
pub use position::{FixedPosition, NoPosition, PositionProvider};
pub use transport::Transport;
pub use types::{
    Address, Coordinate, Country, Measure, ParseCoordinateError, Payload, Route, Routes,
    RoutingOptions, TravelMode, Units,
};
