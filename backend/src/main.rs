//! Backend entry-point: loads configuration, migrates the database and
//! serves the incident REST API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::io;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use incident_backend::inbound::http::health::HealthState;
use incident_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use incident_backend::settings::{ServerSettings, secrets_from_env};
use server::{GeocodingConfig, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;
    let secrets = secrets_from_env(&DefaultEnv::new()).map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let geocoding = GeocodingConfig::new(
        settings.geocoding_endpoint().map_err(io::Error::other)?,
        settings.geocoding_timeout(),
    );
    let allowed_origins = settings.cors_allowed_origins().map_err(io::Error::other)?;

    run_migrations(&secrets.database_url)
        .await
        .map_err(io::Error::other)?;
    let pool = DbPool::new(
        PoolConfig::new(&secrets.database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(io::Error::other)?;

    let config = ServerConfig::new(bind_addr, secrets.maps_api_key, geocoding, pool)
        .with_allowed_origins(allowed_origins);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(make_metrics()?);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "incident backend listening");
    server.await
}

#[cfg(feature = "metrics")]
fn make_metrics() -> io::Result<actix_web_prom::PrometheusMetrics> {
    PrometheusMetricsBuilder::new("incidents")
        .endpoint("/metrics")
        .build()
        .map_err(|e| io::Error::other(format!("configure Prometheus metrics: {e}")))
}
