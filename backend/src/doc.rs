//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the request, response and error schemas. The document backs Swagger
//! UI in debug builds and the `openapi-dump` binary.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::incidents::{
    CreateIncidentRequestBody, IncidentResponseBody, MapLocationBody, MapPositionBody,
    MapProjectionBody, UpdateIncidentRequestBody,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Incident map API",
        description = "Incident reports with geocoded locations and a map-friendly listing."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::incidents::create_incident,
        crate::inbound::http::incidents::list_incident_locations,
        crate::inbound::http::incidents::get_incident,
        crate::inbound::http::incidents::update_incident,
        crate::inbound::http::incidents::delete_incident,
        crate::inbound::http::incidents::get_locations,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CreateIncidentRequestBody,
        UpdateIncidentRequestBody,
        IncidentResponseBody,
        MapPositionBody,
        MapLocationBody,
        MapProjectionBody,
    )),
    tags(
        (name = "incidents", description = "Incident reports and map projection"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
