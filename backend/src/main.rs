//! Backend entry-point: loads settings, prepares the database and serves the
//! REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use calc_api::config::ServiceSettings;
use calc_api::inbound::http::health::HealthState;
use calc_api::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let pool_config = settings.pool_config().map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    if settings.skip_migrations {
        info!(reason = "disabled", "migrations skipped");
    } else {
        run_pending_migrations(pool_config.database_url())
            .await
            .map_err(std::io::Error::other)?;
    }

    let db_pool = DbPool::new(pool_config)
        .await
        .map_err(|e| std::io::Error::other(format!("failed to build database pool: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(bind_addr, db_pool))?;
    server.await
}
