//! State committer
//!
//! Applies a nickname mapping to the live roster one member at a time. A
//! member that cannot be resolved, is out of rank, or whose rename fails is
//! recorded and skipped; the batch always runs to the end.

use nick_core::{GuildId, GuildMember, MemberId, NicknameSnapshot, Threshold};
use tracing::{debug, info, instrument, warn};

use crate::dto::{MemberFailure, MemberRestore, RestoreOutcome, RestoreSummary};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::standing::BotStanding;

/// State committer
pub struct StateCommitter<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StateCommitter<'a> {
    /// Create a new StateCommitter
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply every entry of `snapshot`, sequentially
    ///
    /// Fails only if the bot's own standing cannot be read, in which case no
    /// member has been touched.
    #[instrument(skip(self, snapshot), fields(guild_id = %guild_id, entries = snapshot.len()))]
    pub async fn commit(
        &self,
        guild_id: &GuildId,
        snapshot: &NicknameSnapshot,
        reason: &str,
    ) -> ServiceResult<Vec<MemberRestore>> {
        let standing = BotStanding::fetch(self.ctx.platform(), guild_id).await?;

        let mut results = Vec::with_capacity(snapshot.len());
        for (member_id, target) in snapshot.iter() {
            let outcome = self
                .apply(&standing, guild_id, member_id, target, reason)
                .await;
            results.push(MemberRestore {
                member_id: member_id.clone(),
                outcome,
            });
        }

        info!(summary = %RestoreSummary::from_entries(&results), "Committed nickname state");
        Ok(results)
    }

    async fn apply(
        &self,
        standing: &BotStanding,
        guild_id: &GuildId,
        member_id: &MemberId,
        target: Option<&str>,
        reason: &str,
    ) -> RestoreOutcome {
        let member = match self.resolve(guild_id, member_id).await {
            Some(member) => member,
            None => return RestoreOutcome::Failed(MemberFailure::Unresolved),
        };

        if !standing.permits(Threshold::Apply, &member) {
            debug!(member_id = %member_id, "Member outranks bot, skipped");
            return RestoreOutcome::SkippedInsufficientPrivilege;
        }

        if member.nickname_matches(target) {
            debug!(member_id = %member_id, "Nickname unchanged, skipped");
            return RestoreOutcome::SkippedUnchanged;
        }

        match self
            .ctx
            .platform()
            .set_nickname(guild_id, member_id, target, reason)
            .await
        {
            Ok(()) => {
                debug!(member_id = %member_id, nickname = ?target, "Nickname applied");
                RestoreOutcome::Applied
            }
            Err(e) => {
                warn!(member_id = %member_id, error = %e, "Rename failed");
                RestoreOutcome::Failed(MemberFailure::RenameRejected {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn resolve(&self, guild_id: &GuildId, member_id: &MemberId) -> Option<GuildMember> {
        match self.ctx.platform().resolve_member(guild_id, member_id).await {
            Ok(Some(member)) => Some(member),
            Ok(None) => {
                warn!(member_id = %member_id, "Member not found");
                None
            }
            Err(e) => {
                warn!(member_id = %member_id, error = %e, "Member lookup failed");
                None
            }
        }
    }
}
