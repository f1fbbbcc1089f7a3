//! # nick-api
//!
//! Command surface for the nickname bot, built with Axum.
//!
//! Every guild command passes through the same gate: bot credential, caller
//! identity, then an administrator check on the caller's guild membership.
//! The handlers themselves are thin wrappers over `nick-service`.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server, startup_audit};
pub use state::AppState;
