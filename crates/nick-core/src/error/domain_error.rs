//! Domain errors - structural failures of snapshot and restore operations
//!
//! Per-member problems during a commit (unresolvable member, insufficient
//! privilege, rejected rename) are not errors: they are recorded as restore
//! outcomes and never abort a batch. Everything here aborts the whole
//! operation before any nickname is touched.

use std::path::PathBuf;

use thiserror::Error;

use super::PlatformError;
use crate::value_objects::GuildId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Snapshot Store Errors
    // =========================================================================
    #[error("Snapshot file {path} is corrupt: {reason}")]
    CorruptSnapshot { path: PathBuf, reason: String },

    #[error("No active nickname snapshot for guild {0}")]
    NoActiveSnapshot(GuildId),

    #[error("Snapshot storage error at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Remote Document Errors
    // =========================================================================
    #[error("Invalid remote nickname document: {0}")]
    InvalidRemoteDocument(String),

    #[error("Failed to fetch remote nickname document: {0}")]
    RemoteFetchFailed(String),

    // =========================================================================
    // Capture Errors
    // =========================================================================
    #[error("No members of guild {0} rank below the bot")]
    NothingToCapture(GuildId),

    // =========================================================================
    // Platform Errors (wrapped)
    // =========================================================================
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl DomainError {
    /// Helper for wrapping filesystem errors with their path
    pub fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreIo {
            path: path.into(),
            source,
        }
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::CorruptSnapshot { .. } => "CORRUPT_SNAPSHOT",
            Self::NoActiveSnapshot(_) => "NO_ACTIVE_SNAPSHOT",
            Self::StoreIo { .. } => "STORE_ERROR",
            Self::InvalidRemoteDocument(_) => "INVALID_REMOTE_DOCUMENT",
            Self::RemoteFetchFailed(_) => "REMOTE_FETCH_FAILED",
            Self::NothingToCapture(_) => "NOTHING_TO_CAPTURE",
            Self::Platform(e) => e.code(),
        }
    }

    /// Check if the operation did not apply (nothing to act on)
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NoActiveSnapshot(_) | Self::NothingToCapture(_))
    }

    /// Check if the error came from malformed input or state
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::CorruptSnapshot { .. } | Self::InvalidRemoteDocument(_)
        )
    }

    /// Check if an upstream service (platform or document host) failed
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::RemoteFetchFailed(_) | Self::Platform(_))
    }
}
