//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{GeocodingConfig, ServerConfig};

use state_builders::build_http_state;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use incident_backend::Trace;
#[cfg(debug_assertions)]
use incident_backend::doc::ApiDoc;
use incident_backend::inbound::http::health::{HealthState, live, ready};
use incident_backend::inbound::http::incidents;
use incident_backend::inbound::http::state::HttpState;
use incident_backend::middleware::TRACE_ID_HEADER;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// CORS policy for browser clients on `allowed_origins`.
///
/// Any method and request header is accepted, credentials are allowed and
/// the trace id header is readable by scripts.
fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .expose_headers([TRACE_ID_HEADER])
        .max_age(3600)
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    allowed_origins: &[String],
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(cors(allowed_origins))
        .wrap(Trace)
        .configure(incidents::configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// The health state is marked ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when building adapters or binding the socket
/// fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        bind_addr,
        allowed_origins,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;
    #[cfg(feature = "metrics")]
    let prometheus = prometheus
        .ok_or_else(|| std::io::Error::other("metrics enabled without Prometheus middleware"))?;

    let server = HttpServer::new(move || {
        let app = build_app(
            server_health_state.clone(),
            http_state.clone(),
            &allowed_origins,
        );

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
