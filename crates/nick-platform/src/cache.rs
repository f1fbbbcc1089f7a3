//! Member cache
//!
//! Members seen through enumeration or fetches, keyed per guild. A full
//! enumeration replaces everything held for that guild, so departed members
//! do not linger.

use dashmap::DashMap;
use nick_core::{GuildId, GuildMember, MemberId};

/// Concurrent cache of guild members
#[derive(Debug, Default)]
pub struct MemberCache {
    members: DashMap<(GuildId, MemberId), GuildMember>,
}

impl MemberCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: DashMap::new(),
        }
    }

    /// Cached copy of a member
    pub fn get(&self, guild_id: &GuildId, user_id: &MemberId) -> Option<GuildMember> {
        self.members
            .get(&(guild_id.clone(), user_id.clone()))
            .map(|r| r.clone())
    }

    /// Insert or replace a member
    pub fn insert(&self, member: GuildMember) {
        self.members
            .insert((member.guild_id.clone(), member.user_id.clone()), member);
    }

    /// Replace everything cached for `guild_id` with `members`
    pub fn replace_guild(&self, guild_id: &GuildId, members: &[GuildMember]) {
        self.members.retain(|(guild, _), _| guild != guild_id);
        for member in members {
            self.insert(member.clone());
        }
    }

    /// Drop a member (e.g. after the platform reports it gone)
    pub fn remove(&self, guild_id: &GuildId, user_id: &MemberId) {
        self.members.remove(&(guild_id.clone(), user_id.clone()));
    }

    /// Record a nickname change on a cached member
    ///
    /// Returns false if the member was not cached.
    pub fn update_nickname(
        &self,
        guild_id: &GuildId,
        user_id: &MemberId,
        nickname: Option<&str>,
    ) -> bool {
        match self.members.get_mut(&(guild_id.clone(), user_id.clone())) {
            Some(mut member) => {
                member.set_nickname(nickname.map(str::to_string));
                true
            }
            None => false,
        }
    }

    /// Number of cached members across all guilds
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
