//! The transport seam.
//!
//! A `Transport` performs exactly one HTTP exchange for an `HttpRequest` and
//! hands back the raw body text. It owns everything the endpoints do not
//! care about: the base URL, credentials, TLS, timeouts. Its error type is
//! surfaced to callers unchanged inside `ApiError::Transport`.

use std::fmt;

use async_trait::async_trait;

use crate::http::HttpRequest;

#[async_trait]
pub trait Transport: Send + Sync {
    type Error: Send + fmt::Debug;

    /// Execute `request` and return the response body.
    async fn request(&self, request: &HttpRequest) -> Result<String, Self::Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    type Error = T::Error;

    async fn request(&self, request: &HttpRequest) -> Result<String, Self::Error> {
        (**self).request(request).await
    }
}
