//! Data transfer objects for commands and their reports
//!
//! This module provides:
//! - Request DTOs with validation for command inputs
//! - Report DTOs describing what a command did

pub mod requests;
pub mod responses;

pub use requests::{MassRenameRequest, RemoteRestoreRequest};

pub use responses::{
    AuditReport, AuditStatus, CaptureResponse, GuildAudit, HealthResponse, MassRenameReport,
    MemberFailure, MemberRestore, RestoreOutcome, RestoreReport, RestoreSource, RestoreSummary,
    SnapshotStatusResponse,
};
