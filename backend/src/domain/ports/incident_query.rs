//! Driving port for incident reads and the map projection.

use async_trait::async_trait;

use crate::domain::map_projection::MapProjection;
use crate::domain::{Error, IncidentId, IncidentRecord};

/// Driving port for incident read operations.
///
/// # Examples
///
/// ```rust
/// use incident_backend::domain::ports::{FixtureIncidentQuery, IncidentQuery};
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let projection = FixtureIncidentQuery.map_locations().await?;
/// assert!(projection.locations.is_empty());
/// # Ok::<(), incident_backend::domain::Error>(())
/// # }).expect("fixture projects");
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentQuery: Send + Sync {
    /// Fetch one incident, failing with `not_found` when absent.
    async fn get(&self, id: IncidentId) -> Result<IncidentRecord, Error>;

    /// Every stored incident, ordered by identifier.
    async fn list_all(&self) -> Result<Vec<IncidentRecord>, Error>;

    /// All stored incidents projected into map markers.
    ///
    /// Records with unusable coordinates degrade to fallback markers rather
    /// than failing the call.
    async fn map_locations(&self) -> Result<MapProjection, Error>;
}

/// Fixture query backed by an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIncidentQuery;

#[async_trait]
impl IncidentQuery for FixtureIncidentQuery {
    async fn get(&self, id: IncidentId) -> Result<IncidentRecord, Error> {
        Err(Error::not_found(format!("incident {id} not found")))
    }

    async fn list_all(&self) -> Result<Vec<IncidentRecord>, Error> {
        Ok(Vec::new())
    }

    async fn map_locations(&self) -> Result<MapProjection, Error> {
        Ok(crate::domain::map_projection::project_for_map(&[], ""))
    }
}
