//! Snapshot handlers
//!
//! Capture and inspect a guild's active nickname snapshot.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use nick_service::{
    dto::{CaptureResponse, SnapshotStatusResponse},
    SnapshotCaptureService,
};

use crate::extractors::AdminCaller;
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Describe the active snapshot and its archives
///
/// GET /api/v1/guilds/{guild_id}/nicknames/snapshot
pub async fn get_snapshot(
    State(state): State<AppState>,
    caller: AdminCaller,
) -> ApiResult<Json<SnapshotStatusResponse>> {
    let response = SnapshotCaptureService::new(state.service_context())
        .status(&caller.guild_id)
        .await?;
    Ok(Json(response))
}

/// Capture the guild's nicknames
///
/// POST /api/v1/guilds/{guild_id}/nicknames/snapshot
///
/// `201` with the merged snapshot, or `200` when no member ranks below the
/// bot and nothing was written.
pub async fn capture_snapshot(
    State(state): State<AppState>,
    caller: AdminCaller,
) -> ApiResult<Response> {
    let snapshot = SnapshotCaptureService::new(state.service_context())
        .capture(&caller.guild_id)
        .await?;

    let response = CaptureResponse::from_capture(caller.guild_id, snapshot);
    Ok(if response.is_captured() {
        Created(Json(response)).into_response()
    } else {
        Json(response).into_response()
    })
}
