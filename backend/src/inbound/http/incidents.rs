//! Incident HTTP handlers.
//!
//! ```text
//! POST   /crime
//! GET    /crime/all
//! GET    /crime/{id}
//! PUT    /crime/{id}
//! DELETE /crime/{id}
//! GET    /api/locations
//! ```
//!
//! `/crime/all` must be registered before `/crime/{id}`; [`configure`] does
//! this.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::map_projection::{MapLocation, MapProjection};
use crate::domain::{Error, IncidentId, IncidentPatch, IncidentRecord, NewIncident};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request payload for reporting an incident.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateIncidentRequestBody {
    /// Location description; geocoded to place the incident.
    #[schema(example = "Gifu, Kanazono-cho 1-chome")]
    pub title: String,
    /// Free-text details.
    #[serde(default)]
    #[schema(example = "Bicycle stolen from the station rack")]
    pub info: String,
}

/// Partial update payload.
///
/// Omitted fields are left unchanged. Explicit `null` is rejected because
/// every stored field is required.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateIncidentRequestBody {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub info: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub lng: Option<Option<f64>>,
}

/// Marks a field as present, keeping an explicit `null` as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_null<T>(value: Option<Option<T>>, field: &str) -> Result<Option<T>, Error> {
    match value {
        Some(None) => Err(Error::invalid_request(format!("{field} must not be null"))),
        Some(Some(inner)) => Ok(Some(inner)),
        None => Ok(None),
    }
}

impl TryFrom<UpdateIncidentRequestBody> for IncidentPatch {
    type Error = Error;

    fn try_from(body: UpdateIncidentRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: non_null(body.title, "title")?,
            info: non_null(body.info, "info")?,
            lat: non_null(body.lat, "lat")?,
            lng: non_null(body.lng, "lng")?,
        })
    }
}

/// Stored incident.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct IncidentResponseBody {
    pub id: i32,
    pub title: String,
    pub info: String,
    pub lat: f64,
    pub lng: f64,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<IncidentRecord> for IncidentResponseBody {
    fn from(record: IncidentRecord) -> Self {
        Self {
            id: record.id().get(),
            title: record.title().to_owned(),
            info: record.info().to_owned(),
            lat: record.lat(),
            lng: record.lng(),
            created_at: record.created_at().to_rfc3339(),
            updated_at: record.updated_at().to_rfc3339(),
        }
    }
}

/// Marker position.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MapPositionBody {
    #[schema(example = 35.4096218)]
    pub lat: f64,
    #[schema(example = 136.754722)]
    pub lng: f64,
}

/// One map marker.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MapLocationBody {
    pub position: MapPositionBody,
    pub title: String,
    pub info: String,
}

/// Markers for all stored incidents plus the map provider key.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapProjectionBody {
    pub locations: Vec<MapLocationBody>,
    pub api_key: String,
}

impl From<MapLocation> for MapLocationBody {
    fn from(location: MapLocation) -> Self {
        Self {
            position: MapPositionBody {
                lat: location.position.lat,
                lng: location.position.lng,
            },
            title: location.title,
            info: location.info,
        }
    }
}

impl From<MapProjection> for MapProjectionBody {
    fn from(projection: MapProjection) -> Self {
        Self {
            locations: projection
                .locations
                .into_iter()
                .map(MapLocationBody::from)
                .collect(),
            api_key: projection.api_key,
        }
    }
}

/// Register the incident routes and JSON error handling on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use incident_backend::inbound::http::incidents;
/// use incident_backend::inbound::http::state::HttpState;
///
/// let _app = App::new()
///     .app_data(web::Data::new(HttpState::default()))
///     .configure(incidents::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(create_incident)
        .service(list_incident_locations)
        .service(get_incident)
        .service(update_incident)
        .service(delete_incident)
        .service(get_locations);
}

/// Malformed JSON bodies answer with the domain error envelope.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid JSON body: {err}")).into()
    })
}

/// Ids that are not a valid integer cannot name a stored incident.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        Error::not_found(format!("no incident with id: {err}")).into()
    })
}

/// Report an incident. The title is geocoded before anything is stored.
#[utoipa::path(
    post,
    path = "/crime",
    request_body = CreateIncidentRequestBody,
    responses(
        (status = 200, description = "Incident stored", body = IncidentResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Geocoding or storage failed", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "createIncident"
)]
#[post("/crime")]
pub async fn create_incident(
    state: web::Data<HttpState>,
    payload: web::Json<CreateIncidentRequestBody>,
) -> ApiResult<web::Json<IncidentResponseBody>> {
    let CreateIncidentRequestBody { title, info } = payload.into_inner();
    let incident = NewIncident::new(title, info)
        .map_err(|err| Error::invalid_request(format!("invalid incident: {err}")))?;

    let record = state.incidents.create(incident).await?;
    Ok(web::Json(IncidentResponseBody::from(record)))
}

/// Map markers for every stored incident.
#[utoipa::path(
    get,
    path = "/crime/all",
    responses(
        (status = 200, description = "Map projection", body = MapProjectionBody),
        (status = 500, description = "Storage failed", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "listIncidentLocations"
)]
#[get("/crime/all")]
pub async fn list_incident_locations(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MapProjectionBody>> {
    map_projection(&state).await
}

/// Fetch one incident.
#[utoipa::path(
    get,
    path = "/crime/{id}",
    params(("id" = i32, Path, description = "Incident identifier")),
    responses(
        (status = 200, description = "Incident", body = IncidentResponseBody),
        (status = 404, description = "Unknown incident", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "getIncident"
)]
#[get("/crime/{id}")]
pub async fn get_incident(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<IncidentResponseBody>> {
    let id = IncidentId::new(path.into_inner());
    let record = state.incidents_query.get(id).await?;
    Ok(web::Json(IncidentResponseBody::from(record)))
}

/// Patch the supplied fields of an incident.
///
/// A change the store refuses to commit answers 400 with the error envelope
/// and no incident body.
#[utoipa::path(
    put,
    path = "/crime/{id}",
    params(("id" = i32, Path, description = "Incident identifier")),
    request_body = UpdateIncidentRequestBody,
    responses(
        (status = 200, description = "Updated incident", body = IncidentResponseBody),
        (status = 400, description = "Invalid or uncommitted change", body = Error),
        (status = 404, description = "Unknown incident", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "updateIncident"
)]
#[put("/crime/{id}")]
pub async fn update_incident(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateIncidentRequestBody>,
) -> ApiResult<web::Json<IncidentResponseBody>> {
    let id = IncidentId::new(path.into_inner());
    let patch = IncidentPatch::try_from(payload.into_inner())?;

    let record = state.incidents.update(id, patch).await?;
    Ok(web::Json(IncidentResponseBody::from(record)))
}

/// Permanently delete an incident.
#[utoipa::path(
    delete,
    path = "/crime/{id}",
    params(("id" = i32, Path, description = "Incident identifier")),
    responses(
        (status = 204, description = "Incident deleted"),
        (status = 404, description = "Unknown incident", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "deleteIncident"
)]
#[delete("/crime/{id}")]
pub async fn delete_incident(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state
        .incidents
        .delete(IncidentId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Map markers for every stored incident, for map clients.
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "Map projection", body = MapProjectionBody),
        (status = 500, description = "Storage failed", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "getLocations"
)]
#[get("/api/locations")]
pub async fn get_locations(state: web::Data<HttpState>) -> ApiResult<web::Json<MapProjectionBody>> {
    map_projection(&state).await
}

async fn map_projection(state: &HttpState) -> ApiResult<web::Json<MapProjectionBody>> {
    let projection = state.incidents_query.map_locations().await?;
    Ok(web::Json(MapProjectionBody::from(projection)))
}

#[cfg(test)]
#[path = "incidents_tests.rs"]
mod tests;
