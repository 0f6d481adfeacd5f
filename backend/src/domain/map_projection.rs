//! Projection of stored incidents into map markers.
//!
//! The projection never fails as a whole. A record whose stored coordinates
//! are unusable still produces a marker: it is placed near [`GIFU_CITY`],
//! stepped north by [`FALLBACK_STEP_DEGREES`] per marker already emitted so
//! fallbacks do not stack, and its details carry [`LOCATION_ERROR_MARKER`].

use tracing::warn;

use super::{GIFU_CITY, IncidentRecord};

/// Latitude offset applied per already-emitted marker when falling back.
pub const FALLBACK_STEP_DEGREES: f64 = 0.01;

/// Suffix appended to `info` for markers placed at a fallback position.
pub const LOCATION_ERROR_MARKER: &str = " (location unavailable)";

/// Marker position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPosition {
    pub lat: f64,
    pub lng: f64,
}

/// One map marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLocation {
    pub position: MapPosition,
    pub title: String,
    pub info: String,
}

/// Markers for every stored incident plus the provider key the map client
/// needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MapProjection {
    pub locations: Vec<MapLocation>,
    pub api_key: String,
    /// Records that fell back to a synthetic position.
    pub failures: usize,
}

impl MapProjection {
    fn empty(api_key: String) -> Self {
        Self {
            locations: Vec::new(),
            api_key,
            failures: 0,
        }
    }

    fn fallback_position(&self) -> MapPosition {
        let offset = FALLBACK_STEP_DEGREES * self.locations.len() as f64;
        MapPosition {
            lat: GIFU_CITY.latitude() + offset,
            lng: GIFU_CITY.longitude(),
        }
    }

    fn push(mut self, record: &IncidentRecord) -> Self {
        let location = match record.coordinates() {
            Ok(coordinates) => MapLocation {
                position: MapPosition {
                    lat: coordinates.latitude(),
                    lng: coordinates.longitude(),
                },
                title: record.title().to_owned(),
                info: record.info().to_owned(),
            },
            Err(err) => {
                warn!(
                    incident_id = record.id().get(),
                    error = %err,
                    "incident has unusable coordinates; using fallback position"
                );
                self.failures += 1;
                MapLocation {
                    position: self.fallback_position(),
                    title: record.title().to_owned(),
                    info: format!("{}{LOCATION_ERROR_MARKER}", record.info()),
                }
            }
        };
        self.locations.push(location);
        self
    }
}

/// Project `records` into map markers, in input order.
///
/// # Examples
/// ```
/// use incident_backend::domain::map_projection::project_for_map;
///
/// let projection = project_for_map(&[], "key");
/// assert!(projection.locations.is_empty());
/// assert_eq!(projection.api_key, "key");
/// ```
pub fn project_for_map(records: &[IncidentRecord], api_key: impl Into<String>) -> MapProjection {
    records
        .iter()
        .fold(MapProjection::empty(api_key.into()), MapProjection::push)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for per-record degradation.

    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::{IncidentId, IncidentRecordDraft};

    fn record(id: i32, lat: f64, lng: f64) -> IncidentRecord {
        let at = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        IncidentRecord::new(IncidentRecordDraft {
            id: IncidentId::new(id),
            title: format!("address {id}"),
            info: format!("details {id}"),
            lat,
            lng,
            created_at: at,
            updated_at: at,
        })
        .expect("valid record")
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[rstest]
    fn valid_records_keep_their_positions() {
        let projection = project_for_map(&[record(1, 35.39, 136.85)], "key");

        assert_eq!(projection.failures, 0);
        assert_eq!(
            projection.locations,
            vec![MapLocation {
                position: MapPosition {
                    lat: 35.39,
                    lng: 136.85
                },
                title: "address 1".to_owned(),
                info: "details 1".to_owned(),
            }]
        );
    }

    #[rstest]
    fn unusable_record_falls_back_after_emitted_entries() {
        let records = [
            record(1, 35.1, 136.1),
            record(2, 35.2, 136.2),
            record(3, 35.3, 136.3),
            record(4, f64::NAN, 136.4),
        ];

        let projection = project_for_map(&records, "key");

        assert_eq!(projection.locations.len(), 4);
        assert_eq!(projection.failures, 1);
        let fallback = &projection.locations[3];
        assert_close(fallback.position.lat, 35.409_621_8 + 0.03);
        assert_close(fallback.position.lng, 136.754_722);
        assert_eq!(fallback.title, "address 4");
        assert_eq!(fallback.info, "details 4 (location unavailable)");
        for (location, expected) in projection.locations.iter().zip(&records).take(3) {
            assert_close(location.position.lat, expected.lat());
        }
    }

    #[rstest]
    #[case(f64::INFINITY, 0.0)]
    #[case(0.0, 181.0)]
    #[case(-90.5, 10.0)]
    fn first_fallback_sits_on_origin(#[case] lat: f64, #[case] lng: f64) {
        let projection = project_for_map(&[record(9, lat, lng)], "key");

        assert_eq!(projection.failures, 1);
        assert_eq!(
            projection.locations[0].position,
            MapPosition {
                lat: GIFU_CITY.latitude(),
                lng: GIFU_CITY.longitude()
            }
        );
    }
}
