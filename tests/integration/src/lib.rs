//! Integration test utilities for the nickname bot
//!
//! Re-exports the in-memory platform and document fakes from
//! `nick_service::testing` and adds helpers for running the engine against
//! a real on-disk snapshot store or the full command surface over HTTP.

pub mod helpers;

pub use helpers::*;
pub use nick_service::testing::{
    guild_id, member_id, InMemoryPlatform, Rename, ScriptedDocuments, BOT_ID,
};
