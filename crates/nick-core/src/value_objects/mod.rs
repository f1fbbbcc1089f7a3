//! Value objects - immutable types that represent domain concepts

mod ids;
mod permissions;
mod role_position;

pub use ids::{GuildId, IdParseError, MemberId, RoleId, MAX_ID_LEN};
pub use permissions::Permissions;
pub use role_position::{can_apply, can_capture, RolePosition, Threshold};
