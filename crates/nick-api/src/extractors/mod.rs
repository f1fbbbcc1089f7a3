//! Axum extractors for request handling
//!
//! The command gate is built from composable extractors: [`Authenticated`]
//! checks the bot credential, [`Actor`] reads the caller's identity, and
//! [`AdminCaller`] runs both and then checks the caller's guild standing.

mod auth;
mod command;
mod path;
mod validated;

pub use auth::{Actor, ActorId, AdminCaller, Authenticated, BotToken, ACTOR_ID_HEADER};
pub use command::Command;
pub use path::GuildIdPath;
pub use validated::ValidatedJson;
