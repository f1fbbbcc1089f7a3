//! Per-guild serialization
//!
//! Snapshot load/merge/save and load/commit/archive sequences must not
//! interleave for the same guild. Each guild gets its own async mutex;
//! different guilds never wait on each other.

use std::sync::Arc;

use dashmap::DashMap;
use nick_core::GuildId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-guild locks
#[derive(Debug, Default)]
pub struct GuildLocks {
    locks: DashMap<GuildId, Arc<Mutex<()>>>,
}

impl GuildLocks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to a guild's snapshot
    pub async fn lock(&self, guild_id: &GuildId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await
        let lock = self
            .locks
            .entry(guild_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
