//! Server construction and middleware wiring.

mod config;
mod shutdown;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use calc_api::RequestTrace;
#[cfg(debug_assertions)]
use calc_api::doc::ApiDoc;
use calc_api::inbound::http::configure_api;
use calc_api::inbound::http::health::{HealthState, health, live, ready};
use calc_api::inbound::http::state::HttpState;
use calc_api::outbound::persistence::{DbPool, DieselCalculationRepository, DieselUserRepository};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_http_state(pool: &DbPool) -> HttpState {
    HttpState::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselCalculationRepository::new(pool.clone())),
    )
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let base = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(RequestTrace)
        .configure(configure_api)
        .service(health)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        base.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = base;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Ctrl-C or `SIGTERM` marks `health_state` unhealthy before the server stops
/// accepting connections and drains in-flight requests.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config.db_pool));
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    actix_web::rt::spawn(shutdown::drain(
        health_state.clone(),
        server.handle(),
        shutdown::shutdown_signal(),
    ));
    info!(%bind_addr, "http server listening");
    health_state.mark_ready();
    Ok(server)
}
