//! Error and status types for the geolocation client.
//!
//! # Design
//! Every endpoint settles with `Result<Payload, ApiError<E>>`, where `E` is
//! the transport's own error type. The three ways a call can fail stay
//! distinguishable by variant:
//!
//! - `Server`: the request went through but the body could not be
//!   normalized. Always `Status::ErrorServer`.
//! - `Position`: the device location needed to shape the request could not
//!   be read.
//! - `Transport`: whatever the transport reported, passed through untouched.
//!
//! `Status` is the flat code set applications switch on. Errors that know
//! their code implement `HasStatus`.

use std::fmt;

use thiserror::Error;

/// Stable outcome codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    ErrorPublishableKey,
    ErrorPermissions,
    ErrorLocation,
    ErrorNetwork,
    ErrorBadRequest,
    ErrorUnauthorized,
    ErrorPaymentRequired,
    ErrorForbidden,
    ErrorNotFound,
    ErrorRateLimit,
    ErrorServer,
    ErrorUnknown,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::ErrorPublishableKey => "ERROR_PUBLISHABLE_KEY",
            Status::ErrorPermissions => "ERROR_PERMISSIONS",
            Status::ErrorLocation => "ERROR_LOCATION",
            Status::ErrorNetwork => "ERROR_NETWORK",
            Status::ErrorBadRequest => "ERROR_BAD_REQUEST",
            Status::ErrorUnauthorized => "ERROR_UNAUTHORIZED",
            Status::ErrorPaymentRequired => "ERROR_PAYMENT_REQUIRED",
            Status::ErrorForbidden => "ERROR_FORBIDDEN",
            Status::ErrorNotFound => "ERROR_NOT_FOUND",
            Status::ErrorRateLimit => "ERROR_RATE_LIMIT",
            Status::ErrorServer => "ERROR_SERVER",
            Status::ErrorUnknown => "ERROR_UNKNOWN",
        }
    }

    /// Classify an HTTP status code; 200 is success.
    pub fn from_http(code: u16) -> Self {
        match code {
            200 => Status::Success,
            400 => Status::ErrorBadRequest,
            401 => Status::ErrorUnauthorized,
            402 => Status::ErrorPaymentRequired,
            403 => Status::ErrorForbidden,
            404 => Status::ErrorNotFound,
            429 => Status::ErrorRateLimit,
            500..=599 => Status::ErrorServer,
            _ => Status::ErrorUnknown,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by errors that map onto a `Status`.
pub trait HasStatus {
    fn status(&self) -> Status;
}

/// Why a response body could not be turned into a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The body is not syntactically valid JSON (garbage or truncated).
    #[error("malformed response body: {0}")]
    Malformed(String),

    /// The body is valid JSON but the expected field is missing or has the
    /// wrong shape.
    #[error("unexpected response shape for `{field}`: {detail}")]
    UnexpectedShape { field: &'static str, detail: String },
}

impl HasStatus for NormalizeError {
    fn status(&self) -> Status {
        Status::ErrorServer
    }
}

/// Failure reported by a `PositionProvider`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The user or platform refused access to the device location.
    #[error("location permission denied")]
    PermissionDenied,

    /// A position could not be determined.
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

impl HasStatus for PositionError {
    fn status(&self) -> Status {
        match self {
            PositionError::PermissionDenied => Status::ErrorPermissions,
            PositionError::Unavailable(_) => Status::ErrorLocation,
        }
    }
}

/// Terminal error of an endpoint call.
#[derive(Debug, Error)]
pub enum ApiError<E> {
    #[error("server error: {0}")]
    Server(#[from] NormalizeError),

    #[error("position error: {0}")]
    Position(#[from] PositionError),

    #[error("transport error: {0}")]
    Transport(E),
}

impl<E> ApiError<E> {
    /// The transport's error, if that is what ended the call.
    pub fn transport(&self) -> Option<&E> {
        match self {
            ApiError::Transport(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_transport(self) -> Option<E> {
        match self {
            ApiError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: HasStatus> HasStatus for ApiError<E> {
    fn status(&self) -> Status {
        match self {
            ApiError::Server(e) => e.status(),
            ApiError::Position(e) => e.status(),
            ApiError::Transport(e) => e.status(),
        }
    }
}
