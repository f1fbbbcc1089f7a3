//! REST platform client
//!
//! Implements [`GuildPlatform`] against a Discord-compatible HTTP API.
//! Request timeouts are a client policy set from configuration; the engine
//! itself imposes none.

use async_trait::async_trait;
use nick_common::config::PlatformConfig;
use nick_core::{
    GuildId, GuildMember, GuildPlatform, MemberId, PlatformError, PlatformResult, RoleHierarchy,
};
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::cache::MemberCache;
use crate::wire::{
    CreateMessage, ModifyMember, WireError, WireGuild, WireMember, WireRateLimit, WireRole,
    WireUser,
};

/// Header carrying the audit-log reason of a moderation action
pub const AUDIT_LOG_REASON_HEADER: &str = "X-Audit-Log-Reason";

/// Page size for listing the bot's guilds
const GUILD_PAGE_SIZE: u16 = 200;

/// Platform client over HTTP
pub struct RestPlatformClient {
    http: reqwest::Client,
    api_base: String,
    authorization: String,
    member_page_size: u16,
    cache: MemberCache,
    bot_user: OnceCell<MemberId>,
}

impl RestPlatformClient {
    /// Create a client authenticating with the bot `token`
    pub fn new(config: &PlatformConfig, token: &str) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| PlatformError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            authorization: format!("Bot {token}"),
            member_page_size: config.member_page_size.clamp(1, 1000),
            cache: MemberCache::new(),
            bot_user: OnceCell::new(),
        })
    }

    /// The member cache filled by enumeration and fetches
    ///
    /// Only consulted when a member fetch fails transiently.
    pub fn cache(&self) -> &MemberCache {
        &self.cache
    }

    /// The bot's own user id (fetched once)
    pub async fn bot_user_id(&self) -> PlatformResult<MemberId> {
        self.bot_user
            .get_or_try_init(|| async {
                let user: WireUser = self.get_json("/users/@me", &[]).await?;
                MemberId::parse(&user.id)
                    .map_err(|e| PlatformError::Decode(format!("invalid bot user id: {e}")))
            })
            .await
            .cloned()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    async fn send(&self, request: RequestBuilder) -> PlatformResult<Response> {
        request
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> PlatformResult<T> {
        let response = self.send(self.http.get(self.url(path)).query(query)).await?;
        let response = ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))
    }

    /// Member edit path; the bot edits itself through `@me`
    async fn member_path(&self, guild_id: &GuildId, user_id: &MemberId) -> PlatformResult<String> {
        if *user_id == self.bot_user_id().await? {
            Ok(format!("/guilds/{guild_id}/members/@me"))
        } else {
            Ok(format!("/guilds/{guild_id}/members/{user_id}"))
        }
    }
}

/// Map a non-success response to a platform error
async fn ensure_success(response: Response) -> PlatformResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let header_ms = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok())
            .map(|secs| WireRateLimit { retry_after: secs }.retry_after_ms());
        let body_ms = response
            .json::<WireRateLimit>()
            .await
            .ok()
            .map(|limit| limit.retry_after_ms());
        return Err(PlatformError::RateLimited {
            retry_after_ms: body_ms.or(header_ms).unwrap_or(0),
        });
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<WireError>(&body)
        .ok()
        .and_then(|e| match (e.message, e.code) {
            (Some(message), Some(code)) => Some(format!("{message} (code {code})")),
            (Some(message), None) => Some(message),
            _ => None,
        })
        .unwrap_or_else(|| String::from_utf8_lossy(&body).to_string());

    Err(PlatformError::rejected(status.as_u16(), message))
}

#[async_trait]
impl GuildPlatform for RestPlatformClient {
    #[instrument(skip(self))]
    async fn guilds(&self) -> PlatformResult<Vec<GuildId>> {
        let mut guilds = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("limit", GUILD_PAGE_SIZE.to_string())];
            if let Some(after) = &after {
                query.push(("after", after.clone()));
            }
            let page: Vec<WireGuild> = self.get_json("/users/@me/guilds", &query).await?;
            let full = page.len() >= usize::from(GUILD_PAGE_SIZE);
            after = page.last().map(|g| g.id.clone());

            for guild in &page {
                guilds.push(guild.guild_id()?);
            }
            if !full || after.is_none() {
                break;
            }
        }

        Ok(guilds)
    }

    #[instrument(skip(self), fields(guild_id = %guild_id))]
    async fn members(&self, guild_id: &GuildId) -> PlatformResult<Vec<GuildMember>> {
        let path = format!("/guilds/{guild_id}/members");
        let mut members = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("limit", self.member_page_size.to_string())];
            if let Some(after) = &after {
                query.push(("after", after.clone()));
            }
            let page: Vec<WireMember> = self.get_json(&path, &query).await?;
            let full = page.len() >= usize::from(self.member_page_size);

            for wire in page {
                members.push(wire.into_member(guild_id)?);
            }

            after = members.last().map(|m| m.user_id.to_string());
            if !full || after.is_none() {
                break;
            }
        }

        self.cache.replace_guild(guild_id, &members);
        debug!(count = members.len(), "Enumerated guild members");
        Ok(members)
    }

    async fn current_member(&self, guild_id: &GuildId) -> PlatformResult<GuildMember> {
        let bot_id = self.bot_user_id().await?;
        self.fetch_member(guild_id, &bot_id).await?.ok_or_else(|| {
            PlatformError::rejected(404, format!("bot is not a member of guild {guild_id}"))
        })
    }

    #[instrument(skip(self), fields(guild_id = %guild_id))]
    async fn role_hierarchy(&self, guild_id: &GuildId) -> PlatformResult<RoleHierarchy> {
        let guild: WireGuild = self.get_json(&format!("/guilds/{guild_id}"), &[]).await?;
        let roles: Vec<WireRole> = self
            .get_json(&format!("/guilds/{guild_id}/roles"), &[])
            .await?;

        let roles = roles
            .into_iter()
            .map(WireRole::into_role)
            .collect::<Result<Vec<_>, _>>()?;

        let hierarchy = RoleHierarchy::new(guild_id.clone(), roles);
        Ok(match guild.owner_id()? {
            Some(owner) => hierarchy.with_owner(owner),
            None => hierarchy,
        })
    }

    fn cached_member(&self, guild_id: &GuildId, user_id: &MemberId) -> Option<GuildMember> {
        self.cache.get(guild_id, user_id)
    }

    async fn fetch_member(
        &self,
        guild_id: &GuildId,
        user_id: &MemberId,
    ) -> PlatformResult<Option<GuildMember>> {
        let url = self.url(&format!("/guilds/{guild_id}/members/{user_id}"));
        let response = self.send(self.http.get(url)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            self.cache.remove(guild_id, user_id);
            return Ok(None);
        }

        let wire: WireMember = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))?;
        let member = wire.into_member(guild_id)?;
        self.cache.insert(member.clone());
        Ok(Some(member))
    }

    async fn set_nickname(
        &self,
        guild_id: &GuildId,
        user_id: &MemberId,
        nickname: Option<&str>,
        reason: &str,
    ) -> PlatformResult<()> {
        let path = self.member_path(guild_id, user_id).await?;
        let request = self
            .http
            .patch(self.url(&path))
            .header(AUDIT_LOG_REASON_HEADER, reason)
            .json(&ModifyMember { nick: nickname });

        ensure_success(self.send(request).await?).await?;
        self.cache.update_nickname(guild_id, user_id, nickname);
        Ok(())
    }

    #[instrument(skip(self, message), fields(guild_id = %guild_id))]
    async fn notify(&self, guild_id: &GuildId, message: &str) -> PlatformResult<()> {
        let guild: WireGuild = self.get_json(&format!("/guilds/{guild_id}"), &[]).await?;
        let Some(channel_id) = guild.system_channel_id else {
            debug!("Guild has no default channel, notice not sent");
            return Ok(());
        };

        let request = self
            .http
            .post(self.url(&format!("/channels/{channel_id}/messages")))
            .json(&CreateMessage { content: message });
        ensure_success(self.send(request).await?).await?;
        Ok(())
    }
}
