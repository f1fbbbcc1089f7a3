//! Restore service
//!
//! Local restore consumes the guild's active snapshot: it commits it and then
//! archives it, even when some entries failed. Remote restore commits a
//! fetched document and archives a local snapshot only if one happens to
//! exist. A malformed document aborts before anything is touched.

use nick_core::{DomainError, GuildId, NicknameSnapshot};
use tracing::{info, instrument};

use crate::dto::{RestoreReport, RestoreSource};

use super::commit::StateCommitter;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Audit-log reason recorded on restore renames
pub const RESTORE_REASON: &str = "Nickname restore command called";

/// Restore service
pub struct RestoreService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RestoreService<'a> {
    /// Create a new RestoreService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Restore the guild from its active local snapshot
    ///
    /// # Errors
    /// `NoActiveSnapshot` if nothing was captured, `CorruptSnapshot` if the
    /// snapshot does not parse. The roster is untouched in both cases.
    #[instrument(skip(self), fields(guild_id = %guild_id))]
    pub async fn restore_local(&self, guild_id: &GuildId) -> ServiceResult<RestoreReport> {
        let _guard = self.ctx.locks().lock(guild_id).await;
        let store = self.ctx.store();

        if !store.exists(guild_id).await? {
            return Err(DomainError::NoActiveSnapshot(guild_id.clone()).into());
        }
        let snapshot = store.load(guild_id).await?;

        let entries = StateCommitter::new(self.ctx)
            .commit(guild_id, &snapshot, RESTORE_REASON)
            .await?;
        let archived = store.archive(guild_id).await?;

        let report = RestoreReport::new(
            guild_id.clone(),
            RestoreSource::Local,
            entries,
            Some(archived),
        );
        info!(summary = %report.summary(), "Restored nicknames from local snapshot");
        Ok(report)
    }

    /// Restore the guild from a document at `location`
    ///
    /// # Errors
    /// `RemoteFetchFailed` or `InvalidRemoteDocument`, before any member or
    /// local snapshot is touched.
    #[instrument(skip(self), fields(guild_id = %guild_id))]
    pub async fn restore_remote(
        &self,
        guild_id: &GuildId,
        location: &str,
    ) -> ServiceResult<RestoreReport> {
        let body = self.ctx.documents().fetch(location).await?;
        let snapshot = NicknameSnapshot::from_json(&body)
            .map_err(|e| DomainError::InvalidRemoteDocument(e.to_string()))?;

        let _guard = self.ctx.locks().lock(guild_id).await;
        let store = self.ctx.store();

        let entries = StateCommitter::new(self.ctx)
            .commit(guild_id, &snapshot, RESTORE_REASON)
            .await?;

        let archived = if store.exists(guild_id).await? {
            Some(store.archive(guild_id).await?)
        } else {
            None
        };

        let report = RestoreReport::new(guild_id.clone(), RestoreSource::Remote, entries, archived);
        info!(
            summary = %report.summary(),
            archived = report.archived.is_some(),
            "Restored nicknames from remote document"
        );
        Ok(report)
    }
}
