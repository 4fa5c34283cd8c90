//! Value types exchanged with the geolocation API.
//!
//! # Design
//! Response records mirror the service's camelCase JSON, with every field
//! optional: the service omits fields it cannot resolve, and a missing
//! detail should never turn an otherwise useful answer into an error.
//! Request-side types (`Coordinate`, `TravelMode`, `Units`) know their own
//! wire spelling.
//!
//! Endpoint results come wrapped in `Payload`: the typed record when the
//! field has the documented shape, otherwise the field's raw JSON. A present
//! field is never an error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Wire form: `"lat,lon"`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Returned when a `"lat,lon"` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {0:?}")]
pub struct ParseCoordinateError(pub String);

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseCoordinateError(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let latitude = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        let longitude = lon.trim().parse::<f64>().map_err(|_| invalid())?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid());
        }
        Ok(Self::new(latitude, longitude))
    }
}

/// The extracted response field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload<T> {
    /// The field matched the documented shape.
    Record(T),
    /// The field was present in some other shape, kept verbatim.
    Raw(Value),
}

impl<T> Payload<T> {
    pub fn record(&self) -> Option<&T> {
        match self {
            Payload::Record(record) => Some(record),
            Payload::Raw(_) => None,
        }
    }

    pub fn into_record(self) -> Option<T> {
        match self {
            Payload::Record(record) => Some(record),
            Payload::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&Value> {
        match self {
            Payload::Record(_) => None,
            Payload::Raw(value) => Some(value),
        }
    }
}

impl<T: Serialize> Payload<T> {
    /// The payload as JSON, whichever variant it is.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// One geocoding result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// Meters from the queried coordinate (reverse geocoding only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

impl Address {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }
}

/// Country resolved from the caller's IP address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

/// A numeric quantity paired with its human-readable rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Measure>,
}

/// Distance answer, keyed by travel mode. Only requested modes are present;
/// `geodesic` is the straight-line distance and carries no duration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Routes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geodesic: Option<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foot: Option<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bike: Option<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truck: Option<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motorbike: Option<Route>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Foot,
    Bike,
    Car,
    Truck,
    Motorbike,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Foot => "foot",
            TravelMode::Bike => "bike",
            TravelMode::Car => "car",
            TravelMode::Truck => "truck",
            TravelMode::Motorbike => "motorbike",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Imperial,
    Metric,
}

impl Units {
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }
}

/// Input to the distance endpoint. When `origin` is `None` the device's
/// current position is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingOptions {
    #[serde(default)]
    pub origin: Option<Coordinate>,
    #[serde(default)]
    pub destination: Option<Coordinate>,
    #[serde(default)]
    pub modes: Option<Vec<TravelMode>>,
    #[serde(default)]
    pub units: Option<Units>,
}
