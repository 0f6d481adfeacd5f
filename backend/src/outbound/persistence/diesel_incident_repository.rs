//! PostgreSQL-backed `IncidentRepository` implementation using Diesel ORM.
//!
//! Rows are converted through `IncidentRecord::new`, so a row that breaks the
//! timestamp invariant surfaces as a query error rather than a bad record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{IncidentRepository, IncidentRepositoryError};
use crate::domain::{
    Coordinates, IncidentId, IncidentPatch, IncidentRecord, IncidentRecordDraft, NewIncident,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{IncidentChangeset, IncidentRow, NewIncidentRow};
use super::pool::DbPool;
use super::schema::incidents;

/// Diesel-backed implementation of the incident repository port.
#[derive(Clone)]
pub struct DieselIncidentRepository {
    pool: DbPool,
}

impl DieselIncidentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: IncidentRow) -> Result<IncidentRecord, IncidentRepositoryError> {
    let IncidentRow {
        id,
        title,
        info,
        lat,
        lng,
        created_at,
        updated_at,
    } = row;

    IncidentRecord::new(IncidentRecordDraft {
        id: IncidentId::new(id),
        title,
        info,
        lat,
        lng,
        created_at,
        updated_at,
    })
    .map_err(|err| IncidentRepositoryError::query(format!("incident row {id}: {err}")))
}

fn changeset(patch: &IncidentPatch, now: DateTime<Utc>) -> IncidentChangeset<'_> {
    IncidentChangeset {
        title: patch.title.as_deref(),
        info: patch.info.as_deref(),
        lat: patch.lat,
        lng: patch.lng,
        updated_at: now,
    }
}

#[async_trait]
impl IncidentRepository for DieselIncidentRepository {
    async fn insert(
        &self,
        incident: &NewIncident,
        coordinates: Coordinates,
        now: DateTime<Utc>,
    ) -> Result<IncidentRecord, IncidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewIncidentRow {
            title: incident.title(),
            info: incident.info(),
            lat: coordinates.latitude(),
            lng: coordinates.longitude(),
            created_at: now,
            updated_at: now,
        };

        let row = diesel::insert_into(incidents::table)
            .values(&new_row)
            .returning(IncidentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_record(row)
    }

    async fn list_all(&self) -> Result<Vec<IncidentRecord>, IncidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<IncidentRow> = incidents::table
            .order(incidents::id.asc())
            .select(IncidentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn find_by_id(
        &self,
        id: IncidentId,
    ) -> Result<Option<IncidentRecord>, IncidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = incidents::table
            .find(id.get())
            .select(IncidentRow::as_select())
            .first::<IncidentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn update(
        &self,
        id: IncidentId,
        patch: &IncidentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<IncidentRecord>, IncidentRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let changes = changeset(patch, now);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Lock the row, then write; a failed commit rolls both back.
        let row = conn
            .transaction(|conn| {
                async move {
                    let existing = incidents::table
                        .find(id.get())
                        .select(incidents::id)
                        .for_update()
                        .first::<i32>(conn)
                        .await
                        .optional()?;
                    if existing.is_none() {
                        return Ok(None);
                    }

                    diesel::update(incidents::table.find(id.get()))
                        .set(&changes)
                        .returning(IncidentRow::as_returning())
                        .get_result::<IncidentRow>(conn)
                        .await
                        .map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn delete(&self, id: IncidentId) -> Result<bool, IncidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(incidents::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
