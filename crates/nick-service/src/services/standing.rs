//! The bot's standing in a guild, read fresh for each command
//!
//! Role positions can change between a capture and a restore (including the
//! bot's own promotion), so nothing here is cached across calls.

use nick_core::{GuildId, GuildMember, GuildPlatform, Permissions, RoleHierarchy, RolePosition, Threshold};

use super::error::ServiceResult;

/// The bot's membership, rank, and the hierarchy it was read from
#[derive(Debug, Clone)]
pub struct BotStanding {
    pub bot: GuildMember,
    pub hierarchy: RoleHierarchy,
    pub position: RolePosition,
}

impl BotStanding {
    /// Read the bot's current standing in a guild
    pub async fn fetch(platform: &dyn GuildPlatform, guild_id: &GuildId) -> ServiceResult<Self> {
        let bot = platform.current_member(guild_id).await?;
        let hierarchy = platform.role_hierarchy(guild_id).await?;
        let position = hierarchy.position_of(&bot);
        Ok(Self {
            bot,
            hierarchy,
            position,
        })
    }

    /// Whether the bot may act on `member` under the given threshold
    pub fn permits(&self, threshold: Threshold, member: &GuildMember) -> bool {
        threshold.permits(self.hierarchy.position_of(member), self.position)
    }

    /// The bot's effective guild permissions
    pub fn permissions(&self) -> Permissions {
        self.hierarchy.permissions_of(&self.bot)
    }
}
