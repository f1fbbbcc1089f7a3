//! Nickname command handlers
//!
//! Mass rename and the two restore commands. Per-member failures are part
//! of a successful response; only structural failures map to error statuses.

use axum::{extract::State, Json};
use nick_service::{
    dto::{MassRenameReport, MassRenameRequest, RemoteRestoreRequest, RestoreReport},
    MassRenameService, RestoreService, MASS_RENAME_REASON,
};

use crate::extractors::{AdminCaller, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Rename every member below the bot, recording an undo snapshot first
///
/// POST /api/v1/guilds/{guild_id}/nicknames/mass
pub async fn mass_rename(
    State(state): State<AppState>,
    caller: AdminCaller,
    ValidatedJson(request): ValidatedJson<MassRenameRequest>,
) -> ApiResult<Json<MassRenameReport>> {
    let report = MassRenameService::new(state.service_context())
        .rename_all(
            &caller.guild_id,
            request.nickname.as_deref(),
            MASS_RENAME_REASON,
        )
        .await?;
    Ok(Json(report))
}

/// Restore from the guild's active snapshot and archive it
///
/// POST /api/v1/guilds/{guild_id}/nicknames/restore
pub async fn restore(
    State(state): State<AppState>,
    caller: AdminCaller,
) -> ApiResult<Json<RestoreReport>> {
    let report = RestoreService::new(state.service_context())
        .restore_local(&caller.guild_id)
        .await?;
    Ok(Json(report))
}

/// Restore from a remotely hosted nickname document
///
/// POST /api/v1/guilds/{guild_id}/nicknames/restore/remote
pub async fn restore_remote(
    State(state): State<AppState>,
    caller: AdminCaller,
    ValidatedJson(request): ValidatedJson<RemoteRestoreRequest>,
) -> ApiResult<Json<RestoreReport>> {
    let report = RestoreService::new(state.service_context())
        .restore_remote(&caller.guild_id, &request.url)
        .await?;
    Ok(Json(report))
}
