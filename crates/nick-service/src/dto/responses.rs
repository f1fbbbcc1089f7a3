//! Report DTOs for bot commands
//!
//! All report DTOs implement `Serialize` for JSON output.
//! Ids are serialized as strings.

use std::path::PathBuf;

use nick_core::{GuildId, MemberId, NicknameSnapshot};
use serde::Serialize;

// ============================================================================
// Restore Outcomes
// ============================================================================

/// Why a member could not be restored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "failure", rename_all = "snake_case")]
pub enum MemberFailure {
    /// Neither cached nor fetchable (left the guild, or lookup failed)
    Unresolved,
    /// The platform refused or the request failed
    RenameRejected { reason: String },
}

/// Result of applying one snapshot entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestoreOutcome {
    Applied,
    SkippedUnchanged,
    SkippedInsufficientPrivilege,
    Failed(MemberFailure),
}

impl RestoreOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome for one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRestore {
    pub member_id: MemberId,
    #[serde(flatten)]
    pub outcome: RestoreOutcome,
}

/// Counts of outcomes in a commit batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub total: usize,
    pub applied: usize,
    pub unchanged: usize,
    pub insufficient_privilege: usize,
    pub failed: usize,
}

impl RestoreSummary {
    pub fn from_entries(entries: &[MemberRestore]) -> Self {
        entries.iter().fold(
            Self {
                total: entries.len(),
                ..Self::default()
            },
            |mut summary, entry| {
                match entry.outcome {
                    RestoreOutcome::Applied => summary.applied += 1,
                    RestoreOutcome::SkippedUnchanged => summary.unchanged += 1,
                    RestoreOutcome::SkippedInsufficientPrivilege => {
                        summary.insufficient_privilege += 1;
                    }
                    RestoreOutcome::Failed(_) => summary.failed += 1,
                }
                summary
            },
        )
    }
}

impl std::fmt::Display for RestoreSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} applied, {} unchanged, {} insufficient privilege, {} failed",
            self.applied, self.unchanged, self.insufficient_privilege, self.failed
        )
    }
}

/// Where a restored mapping came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreSource {
    Local,
    Remote,
}

/// Result of a restore command
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub guild_id: GuildId,
    pub source: RestoreSource,
    summary: RestoreSummary,
    pub entries: Vec<MemberRestore>,
    /// Archive the consumed local snapshot was moved to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<PathBuf>,
}

impl RestoreReport {
    pub fn new(
        guild_id: GuildId,
        source: RestoreSource,
        entries: Vec<MemberRestore>,
        archived: Option<PathBuf>,
    ) -> Self {
        Self {
            guild_id,
            source,
            summary: RestoreSummary::from_entries(&entries),
            entries,
            archived,
        }
    }

    pub fn summary(&self) -> RestoreSummary {
        self.summary
    }

    /// Outcome recorded for a member
    pub fn outcome_of(&self, member_id: &MemberId) -> Option<&RestoreOutcome> {
        self.entries
            .iter()
            .find(|e| &e.member_id == member_id)
            .map(|e| &e.outcome)
    }
}

/// Result of a mass nickname change
#[derive(Debug, Clone, Serialize)]
pub struct MassRenameReport {
    pub guild_id: GuildId,
    pub nickname: Option<String>,
    /// Members in the undo snapshot after capture
    pub recorded: usize,
    pub summary: RestoreSummary,
    pub entries: Vec<MemberRestore>,
}

// ============================================================================
// Snapshot Responses
// ============================================================================

/// Response to a capture command
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CaptureResponse {
    Captured {
        captured: bool,
        guild_id: GuildId,
        entries: usize,
        snapshot: NicknameSnapshot,
    },
    NothingEligible {
        captured: bool,
        guild_id: GuildId,
    },
}

impl CaptureResponse {
    pub fn from_capture(guild_id: GuildId, snapshot: Option<NicknameSnapshot>) -> Self {
        match snapshot {
            Some(snapshot) => Self::Captured {
                captured: true,
                guild_id,
                entries: snapshot.len(),
                snapshot,
            },
            None => Self::NothingEligible {
                captured: false,
                guild_id,
            },
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured { .. })
    }
}

/// State of a guild's snapshot storage
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStatusResponse {
    pub guild_id: GuildId,
    pub active: bool,
    pub entries: usize,
    pub archives: Vec<String>,
}

// ============================================================================
// Permission Audit
// ============================================================================

/// Permission status of the bot in one guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditStatus {
    Good,
    Bad { missing: Vec<&'static str> },
    Errored { reason: String },
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "GOOD"),
            Self::Bad { missing } => write!(f, "BAD (missing {})", missing.join(", ")),
            Self::Errored { reason } => write!(f, "ERROR ({reason})"),
        }
    }
}

/// Audit line for one guild
#[derive(Debug, Clone, Serialize)]
pub struct GuildAudit {
    pub guild_id: GuildId,
    #[serde(flatten)]
    pub status: AuditStatus,
}

/// Permission audit across every guild the bot is in
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub guilds: Vec<GuildAudit>,
}

impl AuditReport {
    /// Whether every guild grants the required permissions
    pub fn all_good(&self) -> bool {
        self.guilds.iter().all(|g| g.status == AuditStatus::Good)
    }

    /// Render as a two-column text table
    pub fn table(&self) -> String {
        const LEFT: &str = "Connected Server";
        const RIGHT: &str = "Permission Status";

        let width = self
            .guilds
            .iter()
            .map(|g| g.guild_id.as_str().len())
            .chain(std::iter::once(LEFT.len()))
            .max()
            .unwrap_or(LEFT.len());

        let mut out = format!("{LEFT:<width$} | {RIGHT}\n");
        out.push_str(&format!("{}-+-{}\n", "-".repeat(width), "-".repeat(RIGHT.len())));
        for guild in &self.guilds {
            out.push_str(&format!("{:<width$} | {}\n", guild.guild_id.as_str(), guild.status));
        }
        out
    }
}

// ============================================================================
// Health
// ============================================================================

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
