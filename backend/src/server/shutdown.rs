//! Graceful shutdown: fail liveness first, then let in-flight requests finish.

use std::future::Future;

use actix_web::dev::ServerHandle;
use actix_web::web;
use tracing::{info, warn};

use calc_api::inbound::http::health::HealthState;

/// Resolve on Ctrl-C or, on Unix, `SIGTERM`.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => log_ctrl_c_failure(result),
                    _ = terminate.recv() => {}
                }
            }
            Err(error) => {
                warn!(%error, "SIGTERM handler unavailable; waiting for Ctrl-C only");
                log_ctrl_c_failure(tokio::signal::ctrl_c().await);
            }
        }
    }
    #[cfg(not(unix))]
    log_ctrl_c_failure(tokio::signal::ctrl_c().await);
}

fn log_ctrl_c_failure(result: std::io::Result<()>) {
    if let Err(error) = result {
        warn!(%error, "Ctrl-C handler failed; shutting down");
    }
}

/// Wait for `signal`, mark the process unhealthy and stop the server
/// gracefully.
pub async fn drain(
    health_state: web::Data<HealthState>,
    handle: ServerHandle,
    signal: impl Future<Output = ()>,
) {
    signal.await;
    info!("shutdown requested; draining connections");
    health_state.mark_unhealthy();
    handle.stop(true).await;
}
