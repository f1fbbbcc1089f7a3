//! Business logic services
//!
//! Snapshot capture, commit, restore, mass rename, and permission audit,
//! all sharing one [`ServiceContext`].

pub mod audit;
pub mod capture;
pub mod commit;
pub mod context;
pub mod error;
pub mod locks;
pub mod mass_rename;
pub mod restore;
pub mod standing;

pub use audit::{PermissionAuditService, PERMISSION_WARNING};
pub use capture::SnapshotCaptureService;
pub use commit::StateCommitter;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use locks::GuildLocks;
pub use mass_rename::{MassRenameService, MASS_RENAME_REASON};
pub use restore::{RestoreService, RESTORE_REASON};
pub use standing::BotStanding;
