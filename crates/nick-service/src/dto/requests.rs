//! Request DTOs for bot commands
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

/// Mass nickname change request
///
/// `null` clears every nickname. Nickname content is left to the platform to
/// accept or reject.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MassRenameRequest {
    pub nickname: Option<String>,
}

/// Restore from a remotely hosted nickname document
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RemoteRestoreRequest {
    #[validate(url(message = "Invalid document URL"))]
    pub url: String,
}
