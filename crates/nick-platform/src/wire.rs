//! Wire types for the platform REST API
//!
//! Payloads are decoded loosely (unknown fields ignored) and converted into
//! domain entities; ids that fail validation surface as `Decode` errors.

use nick_core::{
    GuildId, GuildMember, IdParseError, MemberId, Permissions, PlatformError, Role, RoleId,
};
use serde::{Deserialize, Serialize};

fn bad_id(what: &str, err: IdParseError) -> PlatformError {
    PlatformError::Decode(format!("invalid {what} id: {err}"))
}

/// User object (only the fields the engine needs)
#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

/// Guild member object
#[derive(Debug, Clone, Deserialize)]
pub struct WireMember {
    #[serde(default)]
    pub user: Option<WireUser>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl WireMember {
    /// Convert into a domain member of `guild_id`
    pub fn into_member(self, guild_id: &GuildId) -> Result<GuildMember, PlatformError> {
        let user = self
            .user
            .ok_or_else(|| PlatformError::Decode("member without user".to_string()))?;
        let user_id = MemberId::parse(&user.id).map_err(|e| bad_id("user", e))?;
        let role_ids = self
            .roles
            .iter()
            .map(|id| RoleId::parse(id).map_err(|e| bad_id("role", e)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut member = GuildMember::new(guild_id.clone(), user_id).with_roles(role_ids);
        member.nickname = self.nick;
        member.bot = user.bot;
        Ok(member)
    }
}

/// Role object
#[derive(Debug, Clone, Deserialize)]
pub struct WireRole {
    pub id: String,
    pub name: String,
    pub position: i32,
    #[serde(default)]
    pub permissions: Permissions,
}

impl WireRole {
    pub fn into_role(self) -> Result<Role, PlatformError> {
        let id = RoleId::parse(&self.id).map_err(|e| bad_id("role", e))?;
        Ok(Role::new(id, self.name, self.position, self.permissions))
    }
}

/// Guild object (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct WireGuild {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Channel the guild uses for system messages (its "default" channel)
    #[serde(default)]
    pub system_channel_id: Option<String>,
}

impl WireGuild {
    pub fn guild_id(&self) -> Result<GuildId, PlatformError> {
        GuildId::parse(&self.id).map_err(|e| bad_id("guild", e))
    }

    pub fn owner_id(&self) -> Result<Option<MemberId>, PlatformError> {
        self.owner_id
            .as_deref()
            .map(|id| MemberId::parse(id).map_err(|e| bad_id("owner", e)))
            .transpose()
    }
}

/// Body of a plain text message
#[derive(Debug, Serialize)]
pub struct CreateMessage<'a> {
    pub content: &'a str,
}

/// Body of a member edit
#[derive(Debug, Serialize)]
pub struct ModifyMember<'a> {
    /// `null` clears the nickname
    pub nick: Option<&'a str>,
}

/// Error body returned on non-success statuses
#[derive(Debug, Deserialize)]
pub struct WireError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<u64>,
}

/// Body of a 429 response
#[derive(Debug, Deserialize)]
pub struct WireRateLimit {
    /// Seconds to wait, possibly fractional
    pub retry_after: f64,
}

impl WireRateLimit {
    pub fn retry_after_ms(&self) -> u64 {
        (self.retry_after.max(0.0) * 1000.0).ceil() as u64
    }
}
