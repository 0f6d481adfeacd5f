//! Incident lifecycle service.
//!
//! Implements the incident driving ports over a repository and a geocoder.
//! Creation geocodes the title before any write, so a geocoding failure
//! leaves the store untouched.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::map_projection::{MapProjection, project_for_map};
use crate::domain::ports::{
    GeocodingSource, GeocodingSourceError, IncidentCommand, IncidentQuery, IncidentRepository,
    IncidentRepositoryError,
};
use crate::domain::{Error, IncidentId, IncidentPatch, IncidentRecord, NewIncident};

fn map_repository_error(error: IncidentRepositoryError) -> Error {
    match error {
        IncidentRepositoryError::Connection { message } => {
            Error::persistence_failed(format!("incident store unavailable: {message}"))
        }
        IncidentRepositoryError::Query { message }
        | IncidentRepositoryError::Constraint { message } => {
            Error::persistence_failed(format!("incident store error: {message}"))
        }
    }
}

fn map_update_error(error: IncidentRepositoryError) -> Error {
    match error {
        IncidentRepositoryError::Constraint { message } => {
            Error::invalid_request(format!("incident update was not committed: {message}"))
        }
        other => map_repository_error(other),
    }
}

fn map_geocoding_error(address: &str, error: &GeocodingSourceError) -> Error {
    Error::geocoding_failed(format!("could not geocode \"{address}\": {error}"))
}

fn not_found(id: IncidentId) -> Error {
    Error::not_found(format!("incident {id} not found"))
}

/// Incident service implementing [`IncidentCommand`] and [`IncidentQuery`].
#[derive(Clone)]
pub struct IncidentService<R, G> {
    incident_repo: Arc<R>,
    geocoder: Arc<G>,
    clock: Arc<dyn Clock>,
    map_api_key: String,
}

impl<R, G> IncidentService<R, G> {
    /// Create a service. `map_api_key` is passed through to map projections.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use incident_backend::domain::IncidentService;
    /// # use incident_backend::domain::ports::{
    /// #     FixtureGeocodingSource, FixtureIncidentRepository, IncidentQuery,
    /// # };
    /// # use mockable::DefaultClock;
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let service = IncidentService::new(
    ///     Arc::new(FixtureIncidentRepository),
    ///     Arc::new(FixtureGeocodingSource::default()),
    ///     Arc::new(DefaultClock),
    ///     "maps-key",
    /// );
    /// let projection = service.map_locations().await?;
    /// assert_eq!(projection.api_key, "maps-key");
    /// # Ok::<(), incident_backend::domain::Error>(())
    /// # }).expect("fixture projection");
    /// ```
    pub fn new(
        incident_repo: Arc<R>,
        geocoder: Arc<G>,
        clock: Arc<dyn Clock>,
        map_api_key: impl Into<String>,
    ) -> Self {
        Self {
            incident_repo,
            geocoder,
            clock,
            map_api_key: map_api_key.into(),
        }
    }
}

#[async_trait]
impl<R, G> IncidentCommand for IncidentService<R, G>
where
    R: IncidentRepository,
    G: GeocodingSource,
{
    async fn create(&self, incident: NewIncident) -> Result<IncidentRecord, Error> {
        let coordinates = self
            .geocoder
            .resolve(incident.title())
            .await
            .map_err(|err| {
                warn!(error = %err, "geocoding failed; incident not created");
                map_geocoding_error(incident.title(), &err)
            })?;

        let record = self
            .incident_repo
            .insert(&incident, coordinates, self.clock.utc())
            .await
            .map_err(map_repository_error)?;

        info!(incident_id = record.id().get(), "incident created");
        Ok(record)
    }

    async fn update(&self, id: IncidentId, patch: IncidentPatch) -> Result<IncidentRecord, Error> {
        patch
            .validate()
            .map_err(|err| Error::invalid_request(format!("invalid incident patch: {err}")))?;

        let record = self
            .incident_repo
            .update(id, &patch, self.clock.utc())
            .await
            .map_err(map_update_error)?
            .ok_or_else(|| not_found(id))?;

        info!(incident_id = id.get(), "incident updated");
        Ok(record)
    }

    async fn delete(&self, id: IncidentId) -> Result<(), Error> {
        let deleted = self
            .incident_repo
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(not_found(id));
        }

        info!(incident_id = id.get(), "incident deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, G> IncidentQuery for IncidentService<R, G>
where
    R: IncidentRepository,
    G: GeocodingSource,
{
    async fn get(&self, id: IncidentId) -> Result<IncidentRecord, Error> {
        self.incident_repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn list_all(&self) -> Result<Vec<IncidentRecord>, Error> {
        self.incident_repo
            .list_all()
            .await
            .map_err(map_repository_error)
    }

    async fn map_locations(&self) -> Result<MapProjection, Error> {
        let records = self.list_all().await?;
        let projection = project_for_map(&records, self.map_api_key.as_str());
        if projection.failures > 0 {
            warn!(
                failures = projection.failures,
                total = projection.locations.len(),
                "map projection used fallback positions"
            );
        }
        Ok(projection)
    }
}

#[cfg(test)]
#[path = "incident_service_tests.rs"]
mod tests;
