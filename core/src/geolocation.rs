//! Async endpoint calls over a `Transport`.
//!
//! Every call walks the same path: shape the request with `GeoClient`
//! (looking up the device position first if the call needs it), issue one
//! request, normalize the body. The call settles exactly once, either with
//! the payload or with one `ApiError`. Transport errors skip normalization
//! and are returned as they came.
//!
//! A body whose field is present but not in the documented shape still
//! settles successfully, as `Payload::Raw`.

use tracing::{debug, instrument, warn};

use crate::client::GeoClient;
use crate::error::{ApiError, NormalizeError};
use crate::http::HttpRequest;
use crate::position::{NoPosition, PositionProvider};
use crate::transport::Transport;
use crate::types::{Address, Coordinate, Country, Payload, Routes, RoutingOptions};

/// Geolocation API bound to a transport and a position source.
///
/// Holds no mutable state; concurrent calls are independent.
#[derive(Debug, Clone)]
pub struct Geolocation<T, P = NoPosition> {
    client: GeoClient,
    transport: T,
    position: P,
}

impl<T: Transport> Geolocation<T, NoPosition> {
    /// Without a position provider. Calls that need the device position
    /// fail with `ApiError::Position`.
    pub fn new(transport: T) -> Self {
        Self::with_position(transport, NoPosition)
    }
}

impl<T: Transport, P: PositionProvider> Geolocation<T, P> {
    pub fn with_position(transport: T, position: P) -> Self {
        Self {
            client: GeoClient::new(),
            transport,
            position,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Forward geocode a free-form address.
    #[instrument(skip(self))]
    pub async fn geocode(
        &self,
        query: &str,
    ) -> Result<Payload<Vec<Address>>, ApiError<T::Error>> {
        let request = self.client.build_geocode(query);
        let body = self.send(&request).await?;
        let addresses = settle(&request, self.client.parse_geocode(&body))?;
        debug!(count = ?addresses.record().map(Vec::len), "Geocoded query");
        Ok(addresses)
    }

    /// Reverse geocode an explicit coordinate.
    #[instrument(skip(self, coordinate), fields(coordinates = %coordinate))]
    pub async fn reverse_geocode_location(
        &self,
        coordinate: Coordinate,
    ) -> Result<Payload<Vec<Address>>, ApiError<T::Error>> {
        let request = self.client.build_reverse_geocode(coordinate);
        let body = self.send(&request).await?;
        let addresses = settle(&request, self.client.parse_reverse_geocode(&body))?;
        debug!(count = ?addresses.record().map(Vec::len), "Reverse geocoded coordinate");
        Ok(addresses)
    }

    /// Reverse geocode the device's current position.
    #[instrument(skip(self))]
    pub async fn reverse_geocode(&self) -> Result<Payload<Vec<Address>>, ApiError<T::Error>> {
        let coordinate = self.current_position().await?;
        self.reverse_geocode_location(coordinate).await
    }

    /// Country of the caller's IP address.
    #[instrument(skip(self))]
    pub async fn ip_geocode(&self) -> Result<Payload<Country>, ApiError<T::Error>> {
        let request = self.client.build_ip_geocode();
        let body = self.send(&request).await?;
        let country = settle(&request, self.client.parse_ip_geocode(&body))?;
        debug!(
            code = ?country.record().and_then(|c| c.code.as_deref()),
            "Geocoded IP address"
        );
        Ok(country)
    }

    /// Travel distance to `options.destination`. Without an explicit origin
    /// the device position is looked up before the request is issued.
    #[instrument(skip(self, options))]
    pub async fn get_distance_to_destination(
        &self,
        options: &RoutingOptions,
    ) -> Result<Payload<Routes>, ApiError<T::Error>> {
        let origin = match options.origin {
            Some(origin) => origin,
            None => self.current_position().await?,
        };
        let request = self.client.build_distance(Some(origin), options);
        let body = self.send(&request).await?;
        let routes = settle(&request, self.client.parse_distance(&body))?;
        debug!("Resolved route distance");
        Ok(routes)
    }

    async fn current_position(&self) -> Result<Coordinate, ApiError<T::Error>> {
        let coordinate = self.position.current_position().await.map_err(|e| {
            debug!(error = %e, "Position lookup failed");
            ApiError::Position(e)
        })?;
        debug!(%coordinate, "Resolved current position");
        Ok(coordinate)
    }

    async fn send(&self, request: &HttpRequest) -> Result<String, ApiError<T::Error>> {
        self.transport.request(request).await.map_err(|e| {
            debug!(path = %request.path, error = ?e, "Transport failed");
            ApiError::Transport(e)
        })
    }
}

fn settle<V, E>(request: &HttpRequest, result: Result<V, NormalizeError>) -> Result<V, ApiError<E>> {
    result.map_err(|e| {
        warn!(path = %request.path, error = %e, "Server returned an unusable response");
        ApiError::Server(e)
    })
}
