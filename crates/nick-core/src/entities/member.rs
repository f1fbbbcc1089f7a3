//! Member entity - represents a user's membership in a guild

use serde::{Deserialize, Serialize};

use crate::value_objects::{GuildId, MemberId, RoleId};

/// Guild member as seen on the live roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
    pub guild_id: GuildId,
    pub user_id: MemberId,
    pub nickname: Option<String>,
    pub role_ids: Vec<RoleId>,
    /// Whether the underlying account is a bot
    #[serde(default)]
    pub bot: bool,
}

impl GuildMember {
    /// Create a new GuildMember with no nickname and no roles
    pub fn new(guild_id: GuildId, user_id: MemberId) -> Self {
        Self {
            guild_id,
            user_id,
            nickname: None,
            role_ids: Vec::new(),
            bot: false,
        }
    }

    /// Builder-style nickname setter
    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Builder-style role setter
    #[must_use]
    pub fn with_roles(mut self, role_ids: Vec<RoleId>) -> Self {
        self.role_ids = role_ids;
        self
    }

    /// Whether the member's nickname already equals `target`
    #[inline]
    pub fn nickname_matches(&self, target: Option<&str>) -> bool {
        self.nickname.as_deref() == target
    }

    /// Update the member's nickname
    pub fn set_nickname(&mut self, nickname: Option<String>) {
        self.nickname = nickname;
    }
}
