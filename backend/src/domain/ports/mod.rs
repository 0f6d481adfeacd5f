//! Domain ports and supporting types for the hexagonal boundary.

mod geocoding_source;
mod incident_command;
mod incident_query;
mod incident_repository;

#[cfg(test)]
pub use geocoding_source::MockGeocodingSource;
pub use geocoding_source::{FixtureGeocodingSource, GeocodingSource, GeocodingSourceError};
#[cfg(test)]
pub use incident_command::MockIncidentCommand;
pub use incident_command::{FixtureIncidentCommand, IncidentCommand};
#[cfg(test)]
pub use incident_query::MockIncidentQuery;
pub use incident_query::{FixtureIncidentQuery, IncidentQuery};
#[cfg(test)]
pub use incident_repository::MockIncidentRepository;
pub use incident_repository::{
    FixtureIncidentRepository, IncidentRepository, IncidentRepositoryError,
};
