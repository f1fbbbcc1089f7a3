//! Command names attached to routes
//!
//! Routes insert a [`Command`] into the request extensions so the gate can
//! name what was called in its access and denial logs.

use std::fmt;

/// A bot command reachable through the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Audit,
    SnapshotStatus,
    Capture,
    MassRename,
    Restore,
    RemoteRestore,
}

impl Command {
    /// Name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Self::Audit => "audit",
            Self::SnapshotStatus => "snapshot",
            Self::Capture => "capture",
            Self::MassRename => "mass-nick",
            Self::Restore => "restore",
            Self::RemoteRestore => "restore-remote",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
