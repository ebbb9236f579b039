mod auth;
mod handlers;
mod routes;

pub use routes::create_router;

use crate::app_state::AppState;
use crate::config::ServerSettings;
use crate::error::{Result, ServerError};
use axum_server::Handle;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub async fn run_server(app_state: Arc<AppState>, settings: &ServerSettings) -> Result<()> {
    let app: axum::Router = create_router(app_state);

    let addr = SocketAddr::new(
        settings
            .host
            .parse()
            .map_err(|e| ServerError::Init(format!("Invalid host: {}", e)))?,
        settings.port,
    );

    let handle = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    tracing::info!("Listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .map_err(|e| ServerError::Init(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_on_ctrl_c(handle: Handle) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Shutdown signal received");
            handle.graceful_shutdown(Some(Duration::from_secs(10)));
        }
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
