//! Role positions and the privilege comparator
//!
//! A member's position is the position of their highest role; members with
//! no roles sit at [`RolePosition::BASE`]. Positions are read from the live
//! hierarchy at call time and never cached, since ranks change between a
//! capture and the restore that consumes it.
//!
//! The two eligibility checks use different thresholds and must stay separate:
//!
//! - **capture** (`bot > target`): only strict subordinates are recorded, so a
//!   snapshot never holds a member the bot could not plausibly restore later.
//! - **apply** (`bot >= target`): a recorded member at the bot's own rank is
//!   still restored, which tolerates rank changes between capture and restore
//!   such as the bot's own promotion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal placement in a guild's role hierarchy (higher = more authority)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RolePosition(i32);

impl RolePosition {
    /// Position of a member holding only @everyone
    pub const BASE: Self = Self(0);

    #[inline]
    pub const fn new(position: i32) -> Self {
        Self(position)
    }

    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RolePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for RolePosition {
    fn from(position: i32) -> Self {
        Self(position)
    }
}

/// Whether the bot may record `target` in a snapshot (strict: `bot > target`)
#[inline]
pub fn can_capture(target: RolePosition, bot: RolePosition) -> bool {
    bot > target
}

/// Whether the bot may rename `target` during a commit (`bot >= target`)
#[inline]
pub fn can_apply(target: RolePosition, bot: RolePosition) -> bool {
    bot >= target
}

/// Which eligibility check is being made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// Recording a member into a snapshot
    Capture,
    /// Renaming a member during a commit
    Apply,
}

impl Threshold {
    /// Apply this threshold to a pair of positions
    #[inline]
    pub fn permits(self, target: RolePosition, bot: RolePosition) -> bool {
        match self {
            Self::Capture => can_capture(target, bot),
            Self::Apply => can_apply(target, bot),
        }
    }
}
