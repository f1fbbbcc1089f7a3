//! Snapshot capture service
//!
//! Merges the live roster into the guild's active snapshot. Members already
//! recorded are never overwritten, so the snapshot keeps each member's
//! earliest known nickname across any number of captures.

use nick_core::{GuildId, NicknameSnapshot, Threshold};
use tracing::{debug, info, instrument};

use crate::dto::SnapshotStatusResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::standing::BotStanding;

/// Snapshot capture service
pub struct SnapshotCaptureService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SnapshotCaptureService<'a> {
    /// Create a new SnapshotCaptureService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Capture the guild's nicknames
    ///
    /// Returns `None`, writing nothing, when no member ranks below the bot
    /// and nothing was recorded before.
    #[instrument(skip(self), fields(guild_id = %guild_id))]
    pub async fn capture(&self, guild_id: &GuildId) -> ServiceResult<Option<NicknameSnapshot>> {
        let _guard = self.ctx.locks().lock(guild_id).await;
        self.capture_locked(guild_id).await
    }

    /// Capture while the caller holds the guild lock
    pub(crate) async fn capture_locked(
        &self,
        guild_id: &GuildId,
    ) -> ServiceResult<Option<NicknameSnapshot>> {
        let mut snapshot = self.ctx.store().load(guild_id).await?;
        let standing = BotStanding::fetch(self.ctx.platform(), guild_id).await?;
        let members = self.ctx.platform().members(guild_id).await?;

        let mut added = 0usize;
        for member in members {
            if snapshot.contains(&member.user_id) {
                continue;
            }
            if !standing.permits(Threshold::Capture, &member) {
                debug!(member_id = %member.user_id, "Member not below bot, not recorded");
                continue;
            }
            if snapshot.record(member.user_id, member.nickname) {
                added += 1;
            }
        }

        if snapshot.is_empty() {
            info!("No members eligible for capture");
            return Ok(None);
        }

        self.ctx.store().save(guild_id, &snapshot).await?;
        info!(added, total = snapshot.len(), "Captured nickname snapshot");
        Ok(Some(snapshot))
    }

    /// Describe the guild's active snapshot and its archives
    #[instrument(skip(self), fields(guild_id = %guild_id))]
    pub async fn status(&self, guild_id: &GuildId) -> ServiceResult<SnapshotStatusResponse> {
        let _guard = self.ctx.locks().lock(guild_id).await;
        let store = self.ctx.store();

        let active = store.exists(guild_id).await?;
        let entries = if active {
            store.load(guild_id).await?.len()
        } else {
            0
        };
        let archives = store
            .archives(guild_id)
            .await?
            .iter()
            .map(|p| p.display().to_string())
            .collect();

        Ok(SnapshotStatusResponse {
            guild_id: guild_id.clone(),
            active,
            entries,
            archives,
        })
    }
}
