//! Dashboard configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::store::{InvalidationMode, StoreConfig};

const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_STALE_TIME_MS: u64 = 0;

/// Raised when the configured backend root is not an absolute URL.
#[derive(Debug, Error)]
#[error("invalid base URL {value:?}: {source}")]
pub struct InvalidBaseUrl {
    /// Configured value.
    pub value: String,
    /// Parser failure.
    #[source]
    pub source: url::ParseError,
}

/// Configuration values controlling the backend connection and cache.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DASHBOARD")]
pub struct DashboardSettings {
    /// Root URL of the REST backend.
    pub base_url: Option<String>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// How long a fetched collection counts as fresh, in milliseconds.
    pub stale_time_ms: Option<u64>,
    /// Re-read a collection as soon as a write to it is acknowledged.
    pub refetch_after_mutation: Option<bool>,
}

impl DashboardSettings {
    /// Return the configured backend root, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBaseUrl`] when the configured value does not parse.
    pub fn base_url(&self) -> Result<Url, InvalidBaseUrl> {
        let value = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse(value).map_err(|source| InvalidBaseUrl {
            value: value.to_owned(),
            source,
        })
    }

    /// Return the request timeout, falling back to ten seconds.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    /// Return the freshness window, falling back to zero.
    #[must_use]
    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms.unwrap_or(DEFAULT_STALE_TIME_MS))
    }

    /// Return the post-write policy.
    #[must_use]
    pub fn invalidation(&self) -> InvalidationMode {
        if self.refetch_after_mutation.unwrap_or(true) {
            InvalidationMode::Refetch
        } else {
            InvalidationMode::MarkStale
        }
    }

    /// Store tuning derived from these settings.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            stale_time: self.stale_time(),
            invalidation: self.invalidation(),
        }
    }
}
