//! Port abstraction for incident persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    Coordinates, IncidentId, IncidentPatch, IncidentRecord, IncidentRecordDraft, NewIncident,
};

/// Persistence errors raised by incident repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncidentRepositoryError {
    /// Repository connection could not be established.
    #[error("incident repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("incident repository query failed: {message}")]
    Query { message: String },
    /// The store refused to commit a change (constraint or serialization
    /// failure). The transaction has been rolled back.
    #[error("incident repository rejected the change: {message}")]
    Constraint { message: String },
}

impl IncidentRepositoryError {
    /// Helper for connection failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for refused commits.
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }
}

/// Create/read/update/delete access to stored incidents.
///
/// Every call acquires its own store session and releases it on all exit
/// paths.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Persist a new incident and return it with its assigned identifier.
    ///
    /// `created_at` and `updated_at` are both set to `now`.
    async fn insert(
        &self,
        incident: &NewIncident,
        coordinates: Coordinates,
        now: DateTime<Utc>,
    ) -> Result<IncidentRecord, IncidentRepositoryError>;

    /// Every stored incident, ordered by identifier ascending.
    async fn list_all(&self) -> Result<Vec<IncidentRecord>, IncidentRepositoryError>;

    /// Fetch one incident.
    async fn find_by_id(
        &self,
        id: IncidentId,
    ) -> Result<Option<IncidentRecord>, IncidentRepositoryError>;

    /// Apply `patch` and stamp `updated_at = now` in a single transaction.
    ///
    /// Returns `Ok(None)` when no incident has `id`.
    async fn update(
        &self,
        id: IncidentId,
        patch: &IncidentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<IncidentRecord>, IncidentRepositoryError>;

    /// Remove an incident. Returns whether a row was deleted.
    async fn delete(&self, id: IncidentId) -> Result<bool, IncidentRepositoryError>;
}

/// Fixture repository that stores nothing.
///
/// Inserts echo the input back under identifier `1`; lookups find nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIncidentRepository;

#[async_trait]
impl IncidentRepository for FixtureIncidentRepository {
    async fn insert(
        &self,
        incident: &NewIncident,
        coordinates: Coordinates,
        now: DateTime<Utc>,
    ) -> Result<IncidentRecord, IncidentRepositoryError> {
        IncidentRecord::new(IncidentRecordDraft {
            id: IncidentId::new(1),
            title: incident.title().to_owned(),
            info: incident.info().to_owned(),
            lat: coordinates.latitude(),
            lng: coordinates.longitude(),
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| IncidentRepositoryError::constraint(err.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<IncidentRecord>, IncidentRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _id: IncidentId,
    ) -> Result<Option<IncidentRecord>, IncidentRepositoryError> {
        Ok(None)
    }

    async fn update(
        &self,
        _id: IncidentId,
        _patch: &IncidentPatch,
        _now: DateTime<Utc>,
    ) -> Result<Option<IncidentRecord>, IncidentRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _id: IncidentId) -> Result<bool, IncidentRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::GIFU_CITY;

    #[rstest]
    #[tokio::test]
    async fn fixture_echoes_inserted_incident() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let incident = NewIncident::new("Gifu Station", "Lost wallet").expect("valid input");

        let record = FixtureIncidentRepository
            .insert(&incident, GIFU_CITY, now)
            .await
            .expect("fixture insert");

        assert_eq!(record.id(), IncidentId::new(1));
        assert_eq!(record.title(), "Gifu Station");
        assert_eq!(record.created_at(), record.updated_at());
        assert!(
            FixtureIncidentRepository
                .find_by_id(record.id())
                .await
                .expect("fixture lookup")
                .is_none()
        );
    }

    #[rstest]
    fn constraint_error_mentions_rejection() {
        let err = IncidentRepositoryError::constraint("violates check constraint");
        assert!(err.to_string().contains("violates check constraint"));
    }
}
