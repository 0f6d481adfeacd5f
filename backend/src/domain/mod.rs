//! Domain primitives, services and ports.
//!
//! Purpose: define the incident record lifecycle independently of HTTP and
//! SQL. Adapters in `inbound` and `outbound` depend on this module, never the
//! other way round.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - IncidentRecord, NewIncident, IncidentPatch: the incident aggregate and
//!   its inputs.
//! - IncidentService: implements the incident driving ports.
//! - map_projection: pure projection of records into map markers.

pub mod error;
pub mod incident;
mod incident_service;
pub mod map_projection;
pub mod ports;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::incident::{
    Coordinates, GIFU_CITY, INFO_MAX_CHARS, IncidentId, IncidentPatch, IncidentRecord,
    IncidentRecordDraft, IncidentValidationError, NewIncident, TITLE_MAX_CHARS,
};
pub use self::incident_service::IncidentService;
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use incident_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("incident 1 not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
