//! Incident records and the inputs that create or patch them.
//!
//! An incident's `title` is a free-text location description (an address),
//! not a headline; it is the string handed to the geocoder. Coordinates are
//! stored as raw degrees so records with unusable values can still be read
//! back and degraded at projection time instead of failing whole listings.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Maximum length of an incident title, in characters.
pub const TITLE_MAX_CHARS: usize = 255;
/// Maximum length of incident details, in characters.
pub const INFO_MAX_CHARS: usize = 1000;

/// Store-assigned incident identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IncidentId(i32);

impl IncidentId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for incident inputs and coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IncidentValidationError {
    /// Title is blank after trimming.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeds [`TITLE_MAX_CHARS`].
    #[error("title must be at most {max} characters (got {actual})")]
    TitleTooLong { max: usize, actual: usize },
    /// Info exceeds [`INFO_MAX_CHARS`].
    #[error("info must be at most {max} characters (got {actual})")]
    InfoTooLong { max: usize, actual: usize },
    /// Latitude is not finite or outside [-90, 90].
    #[error("latitude {value} must be a finite value within [-90, 90]")]
    InvalidLatitude { value: f64 },
    /// Longitude is not finite or outside [-180, 180].
    #[error("longitude {value} must be a finite value within [-180, 180]")]
    InvalidLongitude { value: f64 },
    /// `updated_at` precedes `created_at`.
    #[error("updated_at must not precede created_at")]
    TimestampsOutOfOrder,
}

/// Gifu city centre; the origin used for map fallback markers.
pub const GIFU_CITY: Coordinates = Coordinates {
    latitude: 35.409_621_8,
    longitude: 136.754_722,
};

/// A validated WGS84 coordinate pair.
///
/// # Examples
/// ```
/// use incident_backend::domain::Coordinates;
///
/// let gifu = Coordinates::new(35.4096218, 136.754722).expect("valid coordinates");
/// assert_eq!(gifu.latitude(), 35.4096218);
/// assert!(Coordinates::new(f64::NAN, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and build a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, IncidentValidationError> {
        validate_latitude(latitude)?;
        validate_longitude(longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn validate_latitude(value: f64) -> Result<(), IncidentValidationError> {
    if value.is_finite() && (-90.0..=90.0).contains(&value) {
        Ok(())
    } else {
        Err(IncidentValidationError::InvalidLatitude { value })
    }
}

fn validate_longitude(value: f64) -> Result<(), IncidentValidationError> {
    if value.is_finite() && (-180.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(IncidentValidationError::InvalidLongitude { value })
    }
}

fn validate_title(title: &str) -> Result<(), IncidentValidationError> {
    if title.trim().is_empty() {
        return Err(IncidentValidationError::EmptyTitle);
    }
    let actual = title.chars().count();
    if actual > TITLE_MAX_CHARS {
        return Err(IncidentValidationError::TitleTooLong {
            max: TITLE_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

fn validate_info(info: &str) -> Result<(), IncidentValidationError> {
    let actual = info.chars().count();
    if actual > INFO_MAX_CHARS {
        return Err(IncidentValidationError::InfoTooLong {
            max: INFO_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

/// Input for creating an incident. Coordinates come from geocoding `title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    title: String,
    info: String,
}

impl NewIncident {
    /// Validate title and info.
    ///
    /// # Examples
    /// ```
    /// use incident_backend::domain::NewIncident;
    ///
    /// let incident = NewIncident::new("Gifu, Naka 1-chome", "Suspicious vehicle")
    ///     .expect("valid input");
    /// assert_eq!(incident.title(), "Gifu, Naka 1-chome");
    /// assert!(NewIncident::new("  ", "no address").is_err());
    /// ```
    pub fn new(
        title: impl Into<String>,
        info: impl Into<String>,
    ) -> Result<Self, IncidentValidationError> {
        let title = title.into();
        let info = info.into();
        validate_title(&title)?;
        validate_info(&info)?;
        Ok(Self { title, info })
    }

    /// Location description used as the geocoding address.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-text incident details.
    #[must_use]
    pub fn info(&self) -> &str {
        &self.info
    }
}

/// Partial update of an incident.
///
/// `None` means "leave unchanged". Every field that is `Some` is applied and
/// `updated_at` is always refreshed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentPatch {
    /// Replacement location description.
    pub title: Option<String>,
    /// Replacement details.
    pub info: Option<String>,
    /// Replacement latitude.
    pub lat: Option<f64>,
    /// Replacement longitude.
    pub lng: Option<f64>,
}

impl IncidentPatch {
    /// Check every present field against the record invariants.
    pub fn validate(&self) -> Result<(), IncidentValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(info) = &self.info {
            validate_info(info)?;
        }
        if let Some(lat) = self.lat {
            validate_latitude(lat)?;
        }
        if let Some(lng) = self.lng {
            validate_longitude(lng)?;
        }
        Ok(())
    }

    /// Whether the patch carries no field changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.info.is_none() && self.lat.is_none() && self.lng.is_none()
    }

    /// Apply present fields to `record`, stamping `updated_at`.
    pub fn apply_to(&self, record: &mut IncidentRecord, updated_at: DateTime<Utc>) {
        if let Some(title) = &self.title {
            record.title.clone_from(title);
        }
        if let Some(info) = &self.info {
            record.info.clone_from(info);
        }
        if let Some(lat) = self.lat {
            record.lat = lat;
        }
        if let Some(lng) = self.lng {
            record.lng = lng;
        }
        record.updated_at = updated_at;
    }
}

/// Field values used to build an [`IncidentRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecordDraft {
    pub id: IncidentId,
    pub title: String,
    pub info: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted incident.
///
/// ## Invariants
/// - `created_at <= updated_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    id: IncidentId,
    title: String,
    info: String,
    lat: f64,
    lng: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IncidentRecord {
    /// Build a record, rejecting timestamps that run backwards.
    pub fn new(draft: IncidentRecordDraft) -> Result<Self, IncidentValidationError> {
        let IncidentRecordDraft {
            id,
            title,
            info,
            lat,
            lng,
            created_at,
            updated_at,
        } = draft;
        if updated_at < created_at {
            return Err(IncidentValidationError::TimestampsOutOfOrder);
        }
        Ok(Self {
            id,
            title,
            info,
            lat,
            lng,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> IncidentId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    /// Stored latitude, unvalidated.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Stored longitude, unvalidated.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stored coordinates, validated for display.
    ///
    /// Fails when the stored values are non-finite or out of range.
    pub fn coordinates(&self) -> Result<Coordinates, IncidentValidationError> {
        Coordinates::new(self.lat, self.lng)
    }
}
