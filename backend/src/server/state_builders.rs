//! Builders for the HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use incident_backend::domain::IncidentService;
use incident_backend::domain::ports::{IncidentCommand, IncidentQuery};
use incident_backend::inbound::http::state::HttpState;
use incident_backend::outbound::geocoding::GoogleGeocodingHttpSource;
use incident_backend::outbound::persistence::{DbPool, DieselIncidentRepository};

use super::ServerConfig;
use super::config::GeocodingConfig;

/// Expose one service through both driving ports.
fn http_state_for<S>(service: S) -> HttpState
where
    S: IncidentCommand + IncidentQuery + 'static,
{
    let service = Arc::new(service);
    HttpState::new(
        service.clone() as Arc<dyn IncidentCommand>,
        service as Arc<dyn IncidentQuery>,
    )
}

fn make_incident_service(
    pool: &DbPool,
    geocoding: &GeocodingConfig,
    maps_api_key: &str,
) -> std::io::Result<IncidentService<DieselIncidentRepository, GoogleGeocodingHttpSource>> {
    let geocoder = GoogleGeocodingHttpSource::new(
        geocoding.endpoint.clone(),
        maps_api_key,
        geocoding.timeout,
    )
    .map_err(|err| std::io::Error::other(format!("geocoding client setup failed: {err}")))?;

    Ok(IncidentService::new(
        Arc::new(DieselIncidentRepository::new(pool.clone())),
        Arc::new(geocoder),
        Arc::new(DefaultClock),
        maps_api_key,
    ))
}

/// Assemble the shared handler state.
///
/// # Errors
/// Returns [`std::io::Error`] when the geocoding HTTP client cannot be built.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let service = make_incident_service(&config.db_pool, &config.geocoding, &config.maps_api_key)?;
    Ok(web::Data::new(http_state_for(service)))
}
