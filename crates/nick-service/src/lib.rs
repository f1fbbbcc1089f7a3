//! # nick-service
//!
//! Application layer: the nickname snapshot and restore engine plus the bot
//! commands built on it.
//!
//! - [`SnapshotCaptureService`] merges the live roster into the guild's
//!   active snapshot
//! - [`StateCommitter`] replays a snapshot onto the roster, one member at a
//!   time, recording an outcome per member
//! - [`RestoreService`] restores from the local snapshot or a remote document
//!   and archives the consumed snapshot
//! - [`MassRenameService`] records an undo snapshot and renames everyone
//! - [`PermissionAuditService`] checks the bot's permissions in every guild
//!
//! The `testing` feature exposes in-memory fakes of every port for use in
//! other crates' tests.

pub mod dto;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use services::{
    GuildLocks, MassRenameService, PermissionAuditService, RestoreService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, SnapshotCaptureService, StateCommitter,
    MASS_RENAME_REASON, PERMISSION_WARNING, RESTORE_REASON,
};
