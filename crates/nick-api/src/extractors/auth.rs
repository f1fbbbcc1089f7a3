//! Command gate extractors
//!
//! A guild command is accepted only when the request carries the bot
//! credential, names its caller in `X-Actor-Id`, and that caller is a human
//! administrator of the guild.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Path},
    http::{header::AUTHORIZATION, request::Parts, HeaderName, HeaderValue},
};
use axum_extra::{
    headers::{self, authorization::Bearer, authorization::Credentials, Authorization, Header},
    TypedHeader,
};
use nick_core::{GuildId, MemberId, Permissions};
use tracing::{debug, info, warn};

use super::command::Command;
use super::path::GuildIdPath;
use crate::response::ApiError;
use crate::state::AppState;

/// Header naming the member on whose behalf a command is issued
pub static ACTOR_ID_HEADER: HeaderName = HeaderName::from_static("x-actor-id");

// ============================================================================
// Credential
// ============================================================================

/// `Authorization: Bot <token>` credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    /// The presented token
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl Credentials for BotToken {
    const SCHEME: &'static str = "Bot";

    fn decode(value: &HeaderValue) -> Option<Self> {
        let token = value.to_str().ok()?.get(Self::SCHEME.len() + 1..)?.trim();
        (!token.is_empty()).then(|| Self(token.to_string()))
    }

    fn encode(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("{} {}", Self::SCHEME, self.0))
            .unwrap_or_else(|_| HeaderValue::from_static("Bot"))
    }
}

/// Request carrying the bot credential, as `Bot <AUTH>` or `Bearer <AUTH>`
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Err(ApiError::MissingAuth);
        }

        let token = match TypedHeader::<Authorization<BotToken>>::from_request_parts(parts, state)
            .await
        {
            Ok(TypedHeader(Authorization(bot))) => bot.0,
            Err(_) => {
                let TypedHeader(Authorization(bearer)) =
                    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                        .await
                        .map_err(|_| ApiError::InvalidCredentials)?;
                bearer.token().to_string()
            }
        };

        if AppState::from_ref(state).accepts_credential(&token) {
            Ok(Authenticated)
        } else {
            warn!("Rejected request with a wrong credential");
            Err(ApiError::InvalidCredentials)
        }
    }
}

// ============================================================================
// Caller identity
// ============================================================================

/// Typed `X-Actor-Id` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorId(pub MemberId);

impl Header for ActorId {
    fn name() -> &'static HeaderName {
        &ACTOR_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|v| v.to_str().ok())
            .and_then(|v| MemberId::parse(v.trim()).ok())
            .map(ActorId)
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(self.0.as_str()) {
            values.extend(std::iter::once(value));
        }
    }
}

/// The member a command was issued by
#[derive(Debug, Clone)]
pub struct Actor(pub MemberId);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(ActorId(id)) = TypedHeader::<ActorId>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::MissingActor)?;
        Ok(Actor(id))
    }
}

// ============================================================================
// Administrator gate
// ============================================================================

/// A guild command issued by an administrator of that guild
#[derive(Debug, Clone)]
pub struct AdminCaller {
    pub guild_id: GuildId,
    pub caller: MemberId,
    pub command: Option<Command>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminCaller
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Authenticated::from_request_parts(parts, state).await?;

        let Path(path) = Path::<GuildIdPath>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;
        let guild_id = path.guild_id()?;

        let Actor(caller) = Actor::from_request_parts(parts, state).await?;
        let command = parts.extensions.get::<Command>().copied();
        let command_name = command.map_or("command", Command::name);

        let app_state = AppState::from_ref(state);
        let platform = app_state.service_context().platform();

        let bot = platform.current_member(&guild_id).await?;
        if bot.user_id == caller {
            return Err(ApiError::SelfCall);
        }

        let Some(member) = platform.resolve_member(&guild_id, &caller).await? else {
            warn!(guild_id = %guild_id, caller = %caller, command = command_name, "[DENIED] caller is not a guild member");
            return Err(ApiError::NotAdministrator(caller));
        };

        if member.bot {
            debug!(guild_id = %guild_id, caller = %caller, "Ignoring command from bot account");
            return Err(ApiError::BotCaller);
        }

        let hierarchy = platform.role_hierarchy(&guild_id).await?;
        if !hierarchy
            .permissions_of(&member)
            .has(Permissions::ADMINISTRATOR)
        {
            warn!(guild_id = %guild_id, caller = %caller, command = command_name, "[DENIED] caller is not an administrator");
            return Err(ApiError::NotAdministrator(caller));
        }

        info!(guild_id = %guild_id, "{command_name} called by {caller}");

        Ok(AdminCaller {
            guild_id,
            caller,
            command,
        })
    }
}
