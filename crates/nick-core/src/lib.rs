//! # nick-core
//!
//! Domain layer containing members, roles, nickname snapshots, the privilege
//! comparator, and the ports the engine talks through.
//! This crate has zero dependencies on infrastructure (filesystem, HTTP, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{GuildMember, NicknameSnapshot, Role, RoleHierarchy};
pub use error::{DomainError, DomainResult, PlatformError};
pub use traits::{GuildPlatform, PlatformResult, RemoteDocumentSource, SnapshotStore};
pub use value_objects::{
    can_apply, can_capture, GuildId, IdParseError, MemberId, Permissions, RoleId, RolePosition,
    Threshold,
};
