//! The device-position seam.
//!
//! Only the distance endpoint (when no origin is given) and
//! `Geolocation::reverse_geocode` consult a `PositionProvider`. How a
//! platform acquires a fix is entirely up to the implementation.

use async_trait::async_trait;

use crate::error::PositionError;
use crate::types::Coordinate;

#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Resolve the device's current coordinate.
    async fn current_position(&self) -> Result<Coordinate, PositionError>;
}

/// Always reports the same coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition(pub Coordinate);

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        Ok(self.0)
    }
}

/// For applications without device location. Every lookup fails with
/// `PositionError::Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosition;

#[async_trait]
impl PositionProvider for NoPosition {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        Err(PositionError::Unavailable(
            "no position provider configured".to_string(),
        ))
    }
}
