//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use incident_backend::outbound::persistence::DbPool;
use reqwest::Url;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Geocoding adapter settings.
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub(crate) endpoint: Url,
    pub(crate) timeout: Duration,
}

impl GeocodingConfig {
    #[must_use]
    pub fn new(endpoint: Url, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) maps_api_key: String,
    pub(crate) geocoding: GeocodingConfig,
    pub(crate) db_pool: DbPool,
    pub(crate) allowed_origins: Vec<String>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration backed by `db_pool`.
    ///
    /// No browser origin is allowed until [`Self::with_allowed_origins`]
    /// is called.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        maps_api_key: impl Into<String>,
        geocoding: GeocodingConfig,
        db_pool: DbPool,
    ) -> Self {
        Self {
            bind_addr,
            maps_api_key: maps_api_key.into(),
            geocoding,
            db_pool,
            allowed_origins: Vec::new(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Set the browser origins accepted by the CORS middleware.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: PrometheusMetrics) -> Self {
        self.prometheus = Some(prometheus);
        self
    }
}
