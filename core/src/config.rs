//! Client configuration

use std::env;

use serde::{Deserialize, Serialize};

pub const BASE_URL_ENV: &str = "GEOLOC_BASE_URL";
pub const PUBLISHABLE_KEY_ENV: &str = "GEOLOC_PUBLISHABLE_KEY";
pub const TIMEOUT_SECS_ENV: &str = "GEOLOC_TIMEOUT_SECS";

/// Settings for `HttpTransport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Publishable key sent as the `Authorization` header
    #[serde(default)]
    pub publishable_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.radar.io".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            publishable_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn new(publishable_key: impl Into<String>) -> Self {
        Self {
            publishable_key: Some(publishable_key.into()),
            ..Self::default()
        }
    }

    /// Defaults overlaid with `GEOLOC_BASE_URL`, `GEOLOC_PUBLISHABLE_KEY`
    /// and `GEOLOC_TIMEOUT_SECS`. Unparsable or empty values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(key) = non_empty(PUBLISHABLE_KEY_ENV) {
            config.publishable_key = Some(key);
        }
        if let Some(secs) = non_empty(TIMEOUT_SECS_ENV).and_then(|v| v.trim().parse().ok()) {
            config.timeout_secs = secs;
        }
        config
    }

    /// A configuration pointing at a local test server.
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            publishable_key: Some("prj_test_pk_0000000000".to_string()),
            timeout_secs: 5,
        }
    }
}
