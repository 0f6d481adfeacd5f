//! Incident lifecycle behaviour through the service and in-memory adapters.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use incident_backend::domain::map_projection::LOCATION_ERROR_MARKER;
use incident_backend::domain::ports::{GeocodingSourceError, IncidentCommand, IncidentQuery};
use incident_backend::domain::{
    Coordinates, ErrorCode, GIFU_CITY, IncidentId, IncidentPatch, IncidentService, NewIncident,
};
use incident_backend::test_support::{
    FixedClock, InMemoryIncidentRepository, StubGeocodingSource,
};
use rstest::{fixture, rstest};

const KANAZONO: &str = "Gifu, Kanazono-cho 1-chome";
const NOWHERE: &str = "Nowhere, Atlantis";

type Service = IncidentService<InMemoryIncidentRepository, StubGeocodingSource>;

struct Harness {
    service: Service,
    repo: Arc<InMemoryIncidentRepository>,
    geocoder: Arc<StubGeocodingSource>,
    clock: Arc<FixedClock>,
}

#[fixture]
fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn harness(start: DateTime<Utc>) -> Harness {
    let repo = Arc::new(InMemoryIncidentRepository::new());
    let geocoder = Arc::new(
        StubGeocodingSource::default()
            .with_location(
                KANAZONO,
                Coordinates::new(35.4095, 136.7568).expect("valid coordinates"),
            )
            .with_failure(
                NOWHERE,
                GeocodingSourceError::rejected("ZERO_RESULTS", "no match"),
            ),
    );
    let clock = Arc::new(FixedClock::new(start));
    let service = IncidentService::new(repo.clone(), geocoder.clone(), clock.clone(), "maps-key");
    Harness {
        service,
        repo,
        geocoder,
        clock,
    }
}

fn incident(title: &str, info: &str) -> NewIncident {
    NewIncident::new(title, info).expect("valid incident")
}

#[rstest]
#[tokio::test]
async fn created_incident_reads_back_with_geocoded_position(
    harness: Harness,
    start: DateTime<Utc>,
) {
    let created = harness
        .service
        .create(incident(KANAZONO, "Bicycle stolen"))
        .await
        .expect("create succeeds");

    assert_eq!(created.title(), KANAZONO);
    assert_eq!(created.lat(), 35.4095);
    assert_eq!(created.lng(), 136.7568);
    assert_eq!(created.created_at(), start);
    assert_eq!(created.updated_at(), start);

    let fetched = harness.service.get(created.id()).await.expect("get succeeds");
    assert_eq!(fetched, created);
}

#[rstest]
#[tokio::test]
async fn geocoding_failure_stores_nothing(harness: Harness) {
    let error = harness
        .service
        .create(incident(NOWHERE, "Lost"))
        .await
        .expect_err("geocoding fails");

    assert_eq!(error.code(), ErrorCode::GeocodingFailed);
    assert!(error.message().contains("ZERO_RESULTS"));
    assert_eq!(harness.geocoder.calls(), 1);
    assert!(harness.repo.is_empty());
}

#[rstest]
#[tokio::test]
async fn patch_changes_only_supplied_fields(harness: Harness, start: DateTime<Utc>) {
    let created = harness
        .service
        .create(incident(KANAZONO, "Bicycle stolen"))
        .await
        .expect("create succeeds");
    let later = start + Duration::minutes(10);
    harness.clock.set(later);

    let updated = harness
        .service
        .update(
            created.id(),
            IncidentPatch {
                info: Some("Bicycle recovered".to_owned()),
                ..IncidentPatch::default()
            },
        )
        .await
        .expect("update succeeds");

    assert_eq!(updated.info(), "Bicycle recovered");
    assert_eq!(updated.title(), created.title());
    assert_eq!(updated.lat(), created.lat());
    assert_eq!(updated.lng(), created.lng());
    assert_eq!(updated.created_at(), start);
    assert_eq!(updated.updated_at(), later);
}

#[rstest]
#[tokio::test]
async fn rejected_commit_leaves_record_untouched(harness: Harness) {
    let created = harness
        .service
        .create(incident(KANAZONO, "Bicycle stolen"))
        .await
        .expect("create succeeds");
    harness
        .repo
        .reject_updates("could not serialize access")
        .expect("store available");

    let error = harness
        .service
        .update(
            created.id(),
            IncidentPatch {
                title: Some("Gifu Station".to_owned()),
                ..IncidentPatch::default()
            },
        )
        .await
        .expect_err("commit rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.message().contains("could not serialize access"));
    let fetched = harness.service.get(created.id()).await.expect("still stored");
    assert_eq!(fetched, created);
}

#[rstest]
#[tokio::test]
async fn missing_ids_are_not_found_everywhere(harness: Harness) {
    let missing = IncidentId::new(404);

    let get = harness.service.get(missing).await.expect_err("absent");
    let update = harness
        .service
        .update(
            missing,
            IncidentPatch {
                info: Some("x".to_owned()),
                ..IncidentPatch::default()
            },
        )
        .await
        .expect_err("absent");
    let delete = harness.service.delete(missing).await.expect_err("absent");

    for error in [get, update, delete] {
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}

#[rstest]
#[tokio::test]
async fn deletion_is_final_and_ids_are_not_reused(harness: Harness) {
    let first = harness
        .service
        .create(incident(KANAZONO, "first"))
        .await
        .expect("create succeeds");

    harness.service.delete(first.id()).await.expect("delete succeeds");

    assert_eq!(
        harness.service.get(first.id()).await.expect_err("gone").code(),
        ErrorCode::NotFound
    );
    assert_eq!(
        harness
            .service
            .delete(first.id())
            .await
            .expect_err("already gone")
            .code(),
        ErrorCode::NotFound
    );

    let second = harness
        .service
        .create(incident(KANAZONO, "second"))
        .await
        .expect("create succeeds");
    assert!(second.id() > first.id());
}

#[rstest]
#[tokio::test]
async fn unusable_coordinates_degrade_one_marker_only(harness: Harness, start: DateTime<Utc>) {
    for (title, lat) in [("a", 35.1), ("b", 35.2), ("c", 35.3)] {
        harness
            .repo
            .insert_raw(title, "ok", lat, 136.7, start)
            .expect("row stored");
    }
    harness
        .repo
        .insert_raw("d", "broken", f64::NAN, 136.7, start)
        .expect("row stored");

    let projection = harness
        .service
        .map_locations()
        .await
        .expect("projection succeeds");

    assert_eq!(projection.api_key, "maps-key");
    assert_eq!(projection.locations.len(), 4);
    assert_eq!(projection.failures, 1);
    let fallback = &projection.locations[3];
    assert!((fallback.position.lat - (GIFU_CITY.latitude() + 0.03)).abs() < 1e-9);
    assert_eq!(fallback.position.lng, GIFU_CITY.longitude());
    assert_eq!(fallback.title, "d");
    assert_eq!(fallback.info, format!("broken{LOCATION_ERROR_MARKER}"));
    assert_eq!(projection.locations[1].position.lat, 35.2);
}

#[rstest]
#[tokio::test]
async fn repeated_listing_is_stable(harness: Harness) {
    for title in [KANAZONO, "Gifu Castle", "Gifu Station"] {
        harness
            .service
            .create(incident(title, ""))
            .await
            .expect("create succeeds");
    }

    let first = harness.service.list_all().await.expect("list succeeds");
    let second = harness.service.list_all().await.expect("list succeeds");

    assert_eq!(first, second);
    let ids: Vec<i32> = first.iter().map(|record| record.id().get()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}
