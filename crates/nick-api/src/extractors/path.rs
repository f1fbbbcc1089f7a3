//! Path parameter extractors

use nick_core::GuildId;

use crate::response::ApiError;

/// Path parameters with guild_id
#[derive(Debug, serde::Deserialize)]
pub struct GuildIdPath {
    pub guild_id: String,
}

impl GuildIdPath {
    /// Parse guild_id as a GuildId
    pub fn guild_id(&self) -> Result<GuildId, ApiError> {
        self.guild_id
            .parse()
            .map_err(|_| ApiError::invalid_path("Invalid guild_id format"))
    }
}
