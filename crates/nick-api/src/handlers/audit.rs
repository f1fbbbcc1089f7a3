//! Permission audit handler

use axum::{extract::State, Json};
use nick_service::{dto::AuditReport, PermissionAuditService};
use tracing::info;

use crate::extractors::Authenticated;
use crate::response::ApiResult;
use crate::state::AppState;

/// Audit the bot's permissions in every guild it belongs to
///
/// GET /api/v1/audit
pub async fn get_audit(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> ApiResult<Json<AuditReport>> {
    info!("audit called");
    let report = PermissionAuditService::new(state.service_context())
        .audit_all()
        .await?;
    Ok(Json(report))
}
