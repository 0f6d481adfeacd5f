//! Driving port for incident mutations.
//!
//! Inbound adapters create, patch and delete incidents through this port
//! without knowing how coordinates are resolved or where records live.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Error, GIFU_CITY, IncidentId, IncidentPatch, IncidentRecord, IncidentRecordDraft, NewIncident,
};

/// Driving port for incident write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentCommand: Send + Sync {
    /// Geocode the incident title and persist the new record.
    ///
    /// Nothing is written when geocoding fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use incident_backend::domain::NewIncident;
    /// use incident_backend::domain::ports::{FixtureIncidentCommand, IncidentCommand};
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let incident = NewIncident::new("Gifu Park", "Unattended bag")?;
    /// let record = FixtureIncidentCommand.create(incident).await?;
    /// assert_eq!(record.title(), "Gifu Park");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// # }).expect("fixture creates");
    /// ```
    async fn create(&self, incident: NewIncident) -> Result<IncidentRecord, Error>;

    /// Apply the present fields of `patch` and refresh `updated_at`.
    async fn update(&self, id: IncidentId, patch: IncidentPatch) -> Result<IncidentRecord, Error>;

    /// Permanently remove an incident.
    async fn delete(&self, id: IncidentId) -> Result<(), Error>;
}

/// Fixture command that places every incident at the Gifu city centre and
/// stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIncidentCommand;

#[async_trait]
impl IncidentCommand for FixtureIncidentCommand {
    async fn create(&self, incident: NewIncident) -> Result<IncidentRecord, Error> {
        let at = DateTime::<Utc>::UNIX_EPOCH;
        IncidentRecord::new(IncidentRecordDraft {
            id: IncidentId::new(1),
            title: incident.title().to_owned(),
            info: incident.info().to_owned(),
            lat: GIFU_CITY.latitude(),
            lng: GIFU_CITY.longitude(),
            created_at: at,
            updated_at: at,
        })
        .map_err(|err| Error::internal(err.to_string()))
    }

    async fn update(
        &self,
        id: IncidentId,
        _patch: IncidentPatch,
    ) -> Result<IncidentRecord, Error> {
        Err(Error::not_found(format!("incident {id} not found")))
    }

    async fn delete(&self, id: IncidentId) -> Result<(), Error> {
        Err(Error::not_found(format!("incident {id} not found")))
    }
}
