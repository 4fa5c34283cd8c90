//! Default `Transport` backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{HasStatus, Status};
use crate::http::HttpRequest;
use crate::transport::Transport;

const USER_AGENT: &str = concat!("geoloc-core/", env!("CARGO_PKG_VERSION"));

/// Errors raised by `HttpTransport`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No publishable key was configured; nothing was sent.
    #[error("missing publishable key")]
    MissingPublishableKey,

    /// The request URL could not be built from the base URL and path.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// Connection failure, timeout, or an unreadable body.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

impl HasStatus for TransportError {
    fn status(&self) -> Status {
        match self {
            TransportError::MissingPublishableKey => Status::ErrorPublishableKey,
            TransportError::InvalidUrl(_) => Status::ErrorBadRequest,
            TransportError::Client(_) => Status::ErrorUnknown,
            TransportError::Network(_) => Status::ErrorNetwork,
            TransportError::Http { status, .. } => Status::from_http(*status),
        }
    }
}

/// Sends requests to the configured base URL with the publishable key.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Error = TransportError;

    #[instrument(skip(self, request), fields(method = request.method.as_str(), path = %request.path))]
    async fn request(&self, request: &HttpRequest) -> Result<String, TransportError> {
        let key = self
            .config
            .publishable_key
            .as_deref()
            .ok_or(TransportError::MissingPublishableKey)?;

        let url = request
            .url(&self.config.base_url)
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        debug!(%url, "Sending request");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, key)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Received response");

        if status != StatusCode::OK {
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
