//! HTTP request description for the host-does-IO pattern.
//!
//! # Design
//! `GeoClient` builds `HttpRequest` values without ever touching the network.
//! Whoever executes the request (a `Transport` implementation, or a host
//! application doing its own I/O) resolves `path` against its base URL and
//! sends `params` as the query string. The service only speaks GET.
//!
//! All fields use owned types so requests can be stored, logged or handed to
//! another thread without lifetime concerns.

use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is relative (for example `v1/geocode/forward`). Parameters whose
/// value was absent at build time are not present in `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    pub(crate) fn get(path: &str) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.to_string(),
            params: Vec::new(),
        }
    }

    /// Append `key=value`, skipping the pair when `value` is absent.
    pub(crate) fn param(mut self, key: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.params.push((key.to_string(), value));
        }
        self
    }

    /// Value of the first parameter named `key`.
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Resolve this request against `base_url`, with the params encoded as
    /// the query string.
    pub fn url(&self, base_url: &str) -> Result<Url, url::ParseError> {
        // `Url::join` drops the last path segment unless the base ends in '/'.
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)?.join(self.path.trim_start_matches('/'))?;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.params);
        }
        Ok(url)
    }
}
