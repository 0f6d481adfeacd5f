//! Driven port for resolving free-text addresses to coordinates.
//!
//! The domain owns the error taxonomy so the incident service can report
//! provider failures without knowing which HTTP API sits behind the port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Coordinates, GIFU_CITY};

/// Errors surfaced while geocoding an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodingSourceError {
    /// Network transport failed or the provider answered with a non-success
    /// HTTP status.
    #[error("geocoding transport failed: {message}")]
    Transport { message: String },
    /// The request exceeded the configured timeout.
    #[error("geocoding timed out: {message}")]
    Timeout { message: String },
    /// The provider answered but reported a non-`OK` status.
    #[error("geocoding provider returned status {status}: {message}")]
    Rejected { status: String, message: String },
    /// The response body did not match the expected schema.
    #[error("geocoding response decode failed: {message}")]
    Decode { message: String },
}

impl GeocodingSourceError {
    /// Helper for transport failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for timeouts.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Helper for provider-reported statuses such as `ZERO_RESULTS`.
    pub fn rejected(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Helper for schema mismatches.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for turning an address into a coordinate pair.
///
/// Implementations issue exactly one provider request per call: no retry,
/// no caching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodingSource: Send + Sync {
    /// Resolve `address` to the provider's first candidate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use incident_backend::domain::ports::{FixtureGeocodingSource, GeocodingSource};
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let coordinates = FixtureGeocodingSource::default()
    ///     .resolve("Gifu, Naka 1-chome")
    ///     .await?;
    /// assert_eq!(coordinates.latitude(), 35.4096218);
    /// # Ok::<(), incident_backend::domain::ports::GeocodingSourceError>(())
    /// # }).expect("fixture resolves");
    /// ```
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodingSourceError>;
}

/// Fixture implementation that resolves every address to the same point.
///
/// Defaults to [`GIFU_CITY`].
#[derive(Debug, Clone, Copy)]
pub struct FixtureGeocodingSource {
    coordinates: Coordinates,
}

impl FixtureGeocodingSource {
    /// Resolve every address to `coordinates`.
    #[must_use]
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

impl Default for FixtureGeocodingSource {
    fn default() -> Self {
        Self {
            coordinates: GIFU_CITY,
        }
    }
}

#[async_trait]
impl GeocodingSource for FixtureGeocodingSource {
    async fn resolve(&self, _address: &str) -> Result<Coordinates, GeocodingSourceError> {
        Ok(self.coordinates)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn rejected_error_includes_raw_status() {
        let err = GeocodingSourceError::rejected("OVER_QUERY_LIMIT", "quota exceeded");
        let message = err.to_string();
        assert!(message.contains("OVER_QUERY_LIMIT"));
        assert!(message.contains("quota exceeded"));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_returns_configured_coordinates() {
        let coordinates = Coordinates::new(35.0, 137.0).expect("valid coordinates");
        let source = FixtureGeocodingSource::new(coordinates);

        let resolved = source.resolve("anywhere").await.expect("fixture resolves");
        assert_eq!(resolved, coordinates);
    }
}
