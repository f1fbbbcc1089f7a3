//! Route definitions
//!
//! Guild commands are mounted under /api/v1/guilds/:guild_id/nicknames.
//! Each route carries its [`Command`] so the gate can name it in logs.

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::extractors::Command;
use crate::handlers::{audit, health, nicknames, snapshots};
use crate::state::AppState;

/// Create the main API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/audit",
            get(audit::get_audit).layer(Extension(Command::Audit)),
        )
        .nest("/guilds/:guild_id/nicknames", nickname_routes())
}

/// Per-guild nickname commands
fn nickname_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/snapshot",
            get(snapshots::get_snapshot)
                .layer(Extension(Command::SnapshotStatus))
                .merge(post(snapshots::capture_snapshot).layer(Extension(Command::Capture))),
        )
        .route(
            "/mass",
            post(nicknames::mass_rename).layer(Extension(Command::MassRename)),
        )
        .route(
            "/restore",
            post(nicknames::restore).layer(Extension(Command::Restore)),
        )
        .route(
            "/restore/remote",
            post(nicknames::restore_remote).layer(Extension(Command::RemoteRestore)),
        )
}
