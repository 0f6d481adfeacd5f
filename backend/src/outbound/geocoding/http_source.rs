//! Reqwest-backed Google Geocoding adapter.
//!
//! This adapter owns transport details only: query parameters, timeout and
//! HTTP error mapping, and strict JSON decoding into coordinates. The API key
//! travels in the query string, so transport errors are stripped of their URL
//! before they reach logs or error payloads.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{GeocodeResponseDto, STATUS_OK};
use crate::domain::Coordinates;
use crate::domain::ports::{GeocodingSource, GeocodingSourceError};

/// Geocoding source that issues one HTTP GET per address against one endpoint.
pub struct GoogleGeocodingHttpSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GoogleGeocodingHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,no_run
    /// # use std::time::Duration;
    /// # use incident_backend::outbound::geocoding::GoogleGeocodingHttpSource;
    /// let endpoint = "https://maps.googleapis.com/maps/api/geocode/json"
    ///     .parse()
    ///     .expect("valid URL");
    /// let source = GoogleGeocodingHttpSource::new(endpoint, "key", Duration::from_secs(10));
    /// assert!(source.is_ok());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl GeocodingSource for GoogleGeocodingHttpSource {
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodingSourceError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        debug!(bytes = body.len(), "geocoding response received");
        parse_coordinates(body.as_ref())
    }
}

fn parse_coordinates(body: &[u8]) -> Result<Coordinates, GeocodingSourceError> {
    let decoded: GeocodeResponseDto = serde_json::from_slice(body).map_err(|error| {
        GeocodingSourceError::decode(format!("invalid geocoding JSON payload: {error}"))
    })?;

    if decoded.status != STATUS_OK {
        let message = decoded
            .error_message
            .unwrap_or_else(|| "no error message provided".to_owned());
        return Err(GeocodingSourceError::rejected(decoded.status, message));
    }

    decoded
        .results
        .into_iter()
        .next()
        .ok_or_else(|| GeocodingSourceError::decode("status OK but results are empty"))?
        .into_coordinates()
        .map_err(GeocodingSourceError::decode)
}

fn map_transport_error(error: reqwest::Error) -> GeocodingSourceError {
    let error = error.without_url();
    if error.is_timeout() {
        GeocodingSourceError::timeout(error.to_string())
    } else {
        GeocodingSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocodingSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GeocodingSourceError::timeout(message)
        }
        _ => GeocodingSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
        format!("{preview}...")
    } else {
        compact
    }
}
