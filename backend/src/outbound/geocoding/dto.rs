//! DTOs for decoding Geocoding API JSON responses.
//!
//! Every field the adapter relies on is required, so a response missing one
//! fails decoding instead of producing a partial result.

use serde::Deserialize;

use crate::domain::Coordinates;

/// Provider status meaning at least one candidate was found.
pub(super) const STATUS_OK: &str = "OK";

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResponseDto {
    pub(super) status: String,
    pub(super) results: Vec<GeocodeResultDto>,
    #[serde(default)]
    pub(super) error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResultDto {
    pub(super) geometry: GeometryDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeometryDto {
    pub(super) location: LocationDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationDto {
    pub(super) lat: f64,
    pub(super) lng: f64,
}

impl GeocodeResultDto {
    pub(super) fn into_coordinates(self) -> Result<Coordinates, String> {
        let LocationDto { lat, lng } = self.geometry.location;
        Coordinates::new(lat, lng).map_err(|err| format!("candidate location is unusable: {err}"))
    }
}
