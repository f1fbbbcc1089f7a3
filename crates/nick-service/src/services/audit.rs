//! Permission audit service
//!
//! Checks, for each guild the bot is in, that it holds every permission its
//! commands need. A guild that cannot be read is reported, not fatal.
//! Guilds found lacking are told so in their default channel.

use nick_core::{GuildId, Permissions};
use tracing::{info, instrument, warn};

use crate::dto::{AuditReport, AuditStatus, GuildAudit};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::standing::BotStanding;

/// Posted to every guild whose audit comes back `Bad`
pub const PERMISSION_WARNING: &str =
    "Warning: This server does not have the correct permissions set to run this bot!";

/// Permission audit service
pub struct PermissionAuditService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionAuditService<'a> {
    /// Create a new PermissionAuditService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Audit every guild the bot belongs to
    ///
    /// # Errors
    /// Fails only if the guild list itself cannot be read.
    #[instrument(skip(self))]
    pub async fn audit_all(&self) -> ServiceResult<AuditReport> {
        let guild_ids = self.ctx.platform().guilds().await?;

        let mut guilds = Vec::with_capacity(guild_ids.len());
        for guild_id in guild_ids {
            let status = self.audit_guild(&guild_id).await;
            guilds.push(GuildAudit { guild_id, status });
        }

        Ok(AuditReport { guilds })
    }

    /// Audit a single guild
    pub async fn audit_guild(&self, guild_id: &GuildId) -> AuditStatus {
        match BotStanding::fetch(self.ctx.platform(), guild_id).await {
            Ok(standing) => {
                let missing = standing.permissions().missing(Permissions::BOT_REQUIRED);
                if missing.is_empty() {
                    AuditStatus::Good
                } else {
                    AuditStatus::Bad {
                        missing: missing.list(),
                    }
                }
            }
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Permission audit failed");
                AuditStatus::Errored {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Audit, log the result as a table, and warn the lacking guilds
    ///
    /// Warnings are best-effort: a guild that cannot be messaged is logged
    /// and skipped.
    pub async fn log_report(&self) -> ServiceResult<AuditReport> {
        let report = self.audit_all().await?;
        for line in report.table().lines() {
            info!("{line}");
        }
        if report.all_good() {
            return Ok(report);
        }

        warn!("Bot lacks required permissions in some guilds");
        for audit in &report.guilds {
            if !matches!(audit.status, AuditStatus::Bad { .. }) {
                continue;
            }
            if let Err(e) = self
                .ctx
                .platform()
                .notify(&audit.guild_id, PERMISSION_WARNING)
                .await
            {
                warn!(guild_id = %audit.guild_id, error = %e, "Could not post permission warning");
            }
        }
        Ok(report)
    }
}
