//! Archive file naming.
//!
//! An archive of `state_42.temp.json` taken at 2026-10-17 09:30:05 local time
//! is named `state_42.temp.json_261017-093005.archive`. A second archive in
//! the same second gets `-1` before the extension, then `-2`, and so on.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

/// Extension marking a consumed snapshot
pub const ARCHIVE_EXTENSION: &str = ".archive";

/// `chrono` format of the archive timestamp (`YYMMDD-HHMMSS`)
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%y%m%d-%H%M%S";

/// Length of a formatted archive timestamp
const STAMP_LEN: usize = 13;

/// Parsed components of an archive file name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArchiveName {
    /// `YYMMDD-HHMMSS` timestamp
    pub stamp: String,
    /// Collision counter, 0 for the first archive of a given second
    pub attempt: u32,
}

impl ArchiveName {
    /// Archive name for a moment in time
    pub fn at<Tz>(time: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            stamp: time.format(ARCHIVE_TIMESTAMP_FORMAT).to_string(),
            attempt: 0,
        }
    }

    /// The same timestamp with the next collision counter
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            stamp: self.stamp.clone(),
            attempt: self.attempt + 1,
        }
    }

    /// Full archive path next to the active snapshot
    pub fn path_for(&self, active: &Path) -> PathBuf {
        let mut name = OsString::from(active.as_os_str());
        name.push("_");
        name.push(&self.stamp);
        if self.attempt > 0 {
            name.push(format!("-{}", self.attempt));
        }
        name.push(ARCHIVE_EXTENSION);
        PathBuf::from(name)
    }

    /// Parse an archive file name belonging to the active file `active_name`
    ///
    /// Returns `None` for files that are not archives of that snapshot.
    pub fn parse(active_name: &str, candidate: &str) -> Option<Self> {
        let rest = candidate
            .strip_prefix(active_name)?
            .strip_prefix('_')?
            .strip_suffix(ARCHIVE_EXTENSION)?;

        let stamp = rest.get(..STAMP_LEN)?;
        if !is_stamp(stamp) {
            return None;
        }

        let attempt = match rest.get(STAMP_LEN..)? {
            "" => 0,
            suffix => suffix.strip_prefix('-')?.parse().ok()?,
        };

        Some(Self {
            stamp: stamp.to_string(),
            attempt,
        })
    }
}

fn is_stamp(s: &str) -> bool {
    s.len() == STAMP_LEN
        && s.char_indices().all(|(i, c)| {
            if i == 6 {
                c == '-'
            } else {
                c.is_ascii_digit()
            }
        })
}
