//! Mass nickname change
//!
//! Records the undo snapshot first, then renames every recorded member. The
//! snapshot stays active so a later restore can put the old names back.

use nick_core::{DomainError, GuildId, NicknameSnapshot};
use tracing::{info, instrument};

use crate::dto::{MassRenameReport, RestoreSummary};

use super::capture::SnapshotCaptureService;
use super::commit::StateCommitter;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Audit-log reason recorded on mass renames
pub const MASS_RENAME_REASON: &str = "Mass nickname change command called";

/// Mass rename service
pub struct MassRenameService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MassRenameService<'a> {
    /// Create a new MassRenameService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Rename every member recorded in the guild's snapshot to `nickname`
    ///
    /// # Errors
    /// `NothingToCapture` if no member ranks below the bot; nobody is renamed.
    #[instrument(skip(self), fields(guild_id = %guild_id))]
    pub async fn rename_all(
        &self,
        guild_id: &GuildId,
        nickname: Option<&str>,
        reason: &str,
    ) -> ServiceResult<MassRenameReport> {
        let _guard = self.ctx.locks().lock(guild_id).await;

        let snapshot = SnapshotCaptureService::new(self.ctx)
            .capture_locked(guild_id)
            .await?
            .ok_or_else(|| DomainError::NothingToCapture(guild_id.clone()))?;

        let targets = NicknameSnapshot::uniform(snapshot.member_ids().cloned(), nickname);
        let entries = StateCommitter::new(self.ctx)
            .commit(guild_id, &targets, reason)
            .await?;

        let summary = RestoreSummary::from_entries(&entries);
        info!(summary = %summary, "Mass nickname change complete");

        Ok(MassRenameReport {
            guild_id: guild_id.clone(),
            nickname: nickname.map(str::to_string),
            recorded: snapshot.len(),
            summary,
            entries,
        })
    }
}
