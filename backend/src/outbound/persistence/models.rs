//! Internal Diesel row structs for the `incidents` table.
//!
//! These types never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::incidents;

/// Row struct for reading from the incidents table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = incidents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IncidentRow {
    pub id: i32,
    pub title: String,
    pub info: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating incidents. `id` is assigned by the store.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = incidents)]
pub(crate) struct NewIncidentRow<'a> {
    pub title: &'a str,
    pub info: &'a str,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for partial updates. `None` fields are left untouched;
/// `updated_at` is always written.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = incidents)]
pub(crate) struct IncidentChangeset<'a> {
    pub title: Option<&'a str>,
    pub info: Option<&'a str>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub updated_at: DateTime<Utc>,
}
