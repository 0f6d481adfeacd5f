//! Test doubles for integration tests.
//!
//! Compiled only with the `test-support` feature. The adapters here behave
//! like the real ones closely enough to exercise the incident lifecycle end
//! to end without PostgreSQL or network access.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::ports::{
    GeocodingSource, GeocodingSourceError, IncidentRepository, IncidentRepositoryError,
};
use crate::domain::{
    Coordinates, GIFU_CITY, IncidentId, IncidentPatch, IncidentRecord, IncidentRecordDraft,
    NewIncident,
};

/// Clock pinned to one instant until moved with [`FixedClock::set`].
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Geocoder answering from a table of addresses.
///
/// Unknown addresses resolve to the configured default. Every call is
/// counted, including failures.
#[derive(Debug)]
pub struct StubGeocodingSource {
    default: Coordinates,
    answers: HashMap<String, Result<Coordinates, GeocodingSourceError>>,
    calls: AtomicUsize,
}

impl Default for StubGeocodingSource {
    fn default() -> Self {
        Self::new(GIFU_CITY)
    }
}

impl StubGeocodingSource {
    pub fn new(default: Coordinates) -> Self {
        Self {
            default,
            answers: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Resolve `address` to `coordinates`.
    #[must_use]
    pub fn with_location(mut self, address: impl Into<String>, coordinates: Coordinates) -> Self {
        self.answers.insert(address.into(), Ok(coordinates));
        self
    }

    /// Fail lookups of `address` with `error`.
    #[must_use]
    pub fn with_failure(mut self, address: impl Into<String>, error: GeocodingSourceError) -> Self {
        self.answers.insert(address.into(), Err(error));
        self
    }

    /// Number of `resolve` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodingSource for StubGeocodingSource {
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodingSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(address)
            .cloned()
            .unwrap_or(Ok(self.default))
    }
}

#[derive(Debug, Default)]
struct Store {
    last_id: i32,
    rows: BTreeMap<i32, IncidentRecord>,
    rejected_updates: Option<String>,
}

/// In-memory incident store with serial ids that are never reused.
#[derive(Debug, Default)]
pub struct InMemoryIncidentRepository {
    store: Mutex<Store>,
}

impl InMemoryIncidentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, IncidentRepositoryError> {
        self.store
            .lock()
            .map_err(|_| IncidentRepositoryError::connection("in-memory store poisoned"))
    }

    /// Store a row verbatim, bypassing coordinate validation.
    ///
    /// Lets tests plant records whose coordinates cannot be displayed.
    pub fn insert_raw(
        &self,
        title: &str,
        info: &str,
        lat: f64,
        lng: f64,
        at: DateTime<Utc>,
    ) -> Result<IncidentId, IncidentRepositoryError> {
        let mut store = self.lock()?;
        store.last_id += 1;
        let id = IncidentId::new(store.last_id);
        let record = IncidentRecord::new(IncidentRecordDraft {
            id,
            title: title.to_owned(),
            info: info.to_owned(),
            lat,
            lng,
            created_at: at,
            updated_at: at,
        })
        .map_err(|err| IncidentRepositoryError::query(err.to_string()))?;
        store.rows.insert(id.get(), record);
        Ok(id)
    }

    /// Make every later update fail to commit with `message`.
    pub fn reject_updates(&self, message: impl Into<String>) -> Result<(), IncidentRepositoryError> {
        self.lock()?.rejected_updates = Some(message.into());
        Ok(())
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.lock().map(|store| store.rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IncidentRepository for InMemoryIncidentRepository {
    async fn insert(
        &self,
        incident: &NewIncident,
        coordinates: Coordinates,
        now: DateTime<Utc>,
    ) -> Result<IncidentRecord, IncidentRepositoryError> {
        let id = self.insert_raw(
            incident.title(),
            incident.info(),
            coordinates.latitude(),
            coordinates.longitude(),
            now,
        )?;
        let store = self.lock()?;
        store
            .rows
            .get(&id.get())
            .cloned()
            .ok_or_else(|| IncidentRepositoryError::query("inserted row vanished"))
    }

    async fn list_all(&self) -> Result<Vec<IncidentRecord>, IncidentRepositoryError> {
        Ok(self.lock()?.rows.values().cloned().collect())
    }

    async fn find_by_id(
        &self,
        id: IncidentId,
    ) -> Result<Option<IncidentRecord>, IncidentRepositoryError> {
        Ok(self.lock()?.rows.get(&id.get()).cloned())
    }

    async fn update(
        &self,
        id: IncidentId,
        patch: &IncidentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<IncidentRecord>, IncidentRepositoryError> {
        let mut store = self.lock()?;
        let Some(current) = store.rows.get(&id.get()) else {
            return Ok(None);
        };
        if let Some(message) = &store.rejected_updates {
            return Err(IncidentRepositoryError::constraint(message.clone()));
        }

        let mut updated = current.clone();
        patch.apply_to(&mut updated, now);
        store.rows.insert(id.get(), updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: IncidentId) -> Result<bool, IncidentRepositoryError> {
        Ok(self.lock()?.rows.remove(&id.get()).is_some())
    }
}
