//! Server setup and initialization
//!
//! Wires the platform client, snapshot store, and document fetcher into the
//! engine, runs the startup permission audit, and serves the command surface.

use std::sync::Arc;

use axum::Router;
use nick_common::{AppConfig, AppError};
use nick_platform::{HttpDocumentFetcher, RestPlatformClient};
use nick_service::{PermissionAuditService, ServiceContext};
use nick_store::FileSnapshotStore;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let platform = RestPlatformClient::new(&config.platform, &config.bot.token)?;
    info!(api_base = %config.platform.api_base, "Platform client ready");

    let store = FileSnapshotStore::from_config(&config.storage);
    info!(template = %config.storage.state_path_template, "Snapshot store ready");

    let documents = HttpDocumentFetcher::new(config.platform.request_timeout())?;

    let service_context = ServiceContext::builder()
        .platform(Arc::new(platform))
        .store(Arc::new(store))
        .documents(Arc::new(documents))
        .build()?;

    Ok(AppState::new(service_context, config))
}

/// Log the bot's permission status in every guild
///
/// Failures are logged; the bot starts regardless.
pub async fn startup_audit(state: &AppState) {
    if let Err(e) = PermissionAuditService::new(state.service_context())
        .log_report()
        .await
    {
        warn!(error = %e, "Startup permission audit failed");
    }
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    info!("Starting command server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::bind(addr, e))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Serve)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, finishing in-flight commands");
}

/// Run the complete bot with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let audit_on_startup = config.audit.on_startup;

    let state = create_app_state(config).await?;

    if audit_on_startup {
        startup_audit(&state).await;
    }

    let app = create_app(state);

    run_server(app, &addr).await
}
