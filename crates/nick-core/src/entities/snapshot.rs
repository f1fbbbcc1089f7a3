//! Nickname snapshot - the undo record for a guild's nicknames
//!
//! Maps member id to the nickname the member had when first recorded (`None`
//! when no nickname was set). Keys are only ever added: [`record`] never
//! replaces an existing entry, so the snapshot always holds the earliest known
//! nickname of each member no matter how many captures run before a restore.
//!
//! The JSON form is a single object of `"member_id": "nick" | null` pairs.
//! Keys are kept sorted so saving the same snapshot twice yields identical
//! bytes.
//!
//! [`record`]: NicknameSnapshot::record

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};

use crate::value_objects::MemberId;

/// Point-in-time mapping of member id to prior nickname
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NicknameSnapshot {
    entries: BTreeMap<MemberId, Option<String>>,
}

impl NicknameSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping that gives every listed member the same nickname
    pub fn uniform<I>(member_ids: I, nickname: Option<&str>) -> Self
    where
        I: IntoIterator<Item = MemberId>,
    {
        member_ids
            .into_iter()
            .map(|id| (id, nickname.map(str::to_owned)))
            .collect()
    }

    /// Parse the JSON object form
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serialize to the JSON object form
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Record a member's nickname unless the member is already present
    ///
    /// Returns `true` if the entry was added.
    pub fn record(&mut self, member_id: MemberId, nickname: Option<String>) -> bool {
        match self.entries.entry(member_id) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(nickname);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Check whether a member has been recorded
    #[inline]
    pub fn contains(&self, member_id: &MemberId) -> bool {
        self.entries.contains_key(member_id)
    }

    /// The recorded nickname; `Some(None)` means "recorded with no nickname"
    pub fn get(&self, member_id: &MemberId) -> Option<Option<&str>> {
        self.entries.get(member_id).map(Option::as_deref)
    }

    /// Iterate entries in member id order
    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, Option<&str>)> {
        self.entries.iter().map(|(id, nick)| (id, nick.as_deref()))
    }

    /// Recorded member ids
    pub fn member_ids(&self) -> impl Iterator<Item = &MemberId> {
        self.entries.keys()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(MemberId, Option<String>)> for NicknameSnapshot {
    fn from_iter<T: IntoIterator<Item = (MemberId, Option<String>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for NicknameSnapshot {
    type Item = (MemberId, Option<String>);
    type IntoIter = btree_map::IntoIter<MemberId, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
