//! Ports - the interfaces the engine talks through
//!
//! The domain layer defines what it needs from the chat platform, from
//! durable storage, and from remote document hosts; infrastructure crates
//! provide the implementations.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::entities::{GuildMember, NicknameSnapshot, RoleHierarchy};
use crate::error::{DomainResult, PlatformError};
use crate::value_objects::{GuildId, MemberId};

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

// ============================================================================
// Chat Platform
// ============================================================================

/// Boundary to the chat platform client
#[async_trait]
pub trait GuildPlatform: Send + Sync {
    /// Guilds the bot is a member of
    async fn guilds(&self) -> PlatformResult<Vec<GuildId>>;

    /// Enumerate the current members of a guild
    async fn members(&self, guild_id: &GuildId) -> PlatformResult<Vec<GuildMember>>;

    /// The bot's own membership record in a guild
    async fn current_member(&self, guild_id: &GuildId) -> PlatformResult<GuildMember>;

    /// The guild's role hierarchy as of now
    async fn role_hierarchy(&self, guild_id: &GuildId) -> PlatformResult<RoleHierarchy>;

    /// Member from the local cache, without touching the network
    ///
    /// May be stale: only [`resolve_member`](Self::resolve_member) falls back
    /// to it.
    fn cached_member(&self, guild_id: &GuildId, user_id: &MemberId) -> Option<GuildMember>;

    /// Fetch a member over the network (`None` if not in the guild)
    async fn fetch_member(
        &self,
        guild_id: &GuildId,
        user_id: &MemberId,
    ) -> PlatformResult<Option<GuildMember>>;

    /// Resolve a member's current state
    ///
    /// Fetches first. The cached copy is used only when the platform cannot
    /// answer right now; a definite answer (including "not a member") always
    /// wins over the cache.
    async fn resolve_member(
        &self,
        guild_id: &GuildId,
        user_id: &MemberId,
    ) -> PlatformResult<Option<GuildMember>> {
        match self.fetch_member(guild_id, user_id).await {
            Err(e) if e.is_transient() => match self.cached_member(guild_id, user_id) {
                Some(member) => Ok(Some(member)),
                None => Err(e),
            },
            result => result,
        }
    }

    /// Set (or clear, with `None`) a member's nickname
    ///
    /// `reason` is recorded in the guild's audit log.
    async fn set_nickname(
        &self,
        guild_id: &GuildId,
        user_id: &MemberId,
        nickname: Option<&str>,
        reason: &str,
    ) -> PlatformResult<()>;

    /// Post a plain message to the guild's default channel
    ///
    /// A guild without one is not an error; nothing is sent.
    async fn notify(&self, guild_id: &GuildId, message: &str) -> PlatformResult<()>;
}

// ============================================================================
// Snapshot Store
// ============================================================================

/// Durable storage of one active nickname snapshot per guild
///
/// Callers must serialize access per guild: load/merge/save and
/// load/commit/archive sequences are not safe under interleaving.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the active snapshot, or an empty one if none exists
    ///
    /// Fails with `CorruptSnapshot` if the active file does not parse.
    async fn load(&self, guild_id: &GuildId) -> DomainResult<NicknameSnapshot>;

    /// Atomically replace the active snapshot
    async fn save(&self, guild_id: &GuildId, snapshot: &NicknameSnapshot) -> DomainResult<()>;

    /// Check whether an active snapshot exists
    async fn exists(&self, guild_id: &GuildId) -> DomainResult<bool>;

    /// Move the active snapshot to a timestamped archive, returning its path
    ///
    /// Fails with `NoActiveSnapshot` if there is nothing to archive.
    async fn archive(&self, guild_id: &GuildId) -> DomainResult<PathBuf>;

    /// Archived snapshots of a guild, oldest first
    async fn archives(&self, guild_id: &GuildId) -> DomainResult<Vec<PathBuf>>;
}

// ============================================================================
// Remote Documents
// ============================================================================

/// Source of remotely hosted nickname documents
#[async_trait]
pub trait RemoteDocumentSource: Send + Sync {
    /// Fetch the raw document body at `location`
    ///
    /// Fails with `RemoteFetchFailed`; parsing is the caller's concern.
    async fn fetch(&self, location: &str) -> DomainResult<Vec<u8>>;
}
