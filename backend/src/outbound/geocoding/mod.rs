//! Geocoding outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `GeocodingSource`
//! port against the Google Maps Geocoding API.

mod dto;
mod http_source;

pub use http_source::GoogleGeocodingHttpSource;
