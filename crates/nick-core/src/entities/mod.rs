//! Domain entities - core business objects

mod member;
mod role;
mod snapshot;

pub use member::GuildMember;
pub use role::{Role, RoleHierarchy};
pub use snapshot::NicknameSnapshot;
