//! Role entity and the per-call role hierarchy

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::GuildMember;
use crate::value_objects::{GuildId, MemberId, Permissions, RoleId, RolePosition};

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    #[serde(default)]
    pub name: String,
    pub position: RolePosition,
    #[serde(default)]
    pub permissions: Permissions,
}

impl Role {
    /// Create a new Role
    pub fn new(id: RoleId, name: impl Into<String>, position: i32, permissions: Permissions) -> Self {
        Self {
            id,
            name: name.into(),
            position: RolePosition::new(position),
            permissions,
        }
    }

    /// Compare role positions for hierarchy (higher position = more authority)
    #[inline]
    pub fn is_higher_than(&self, other: &Role) -> bool {
        self.position > other.position
    }
}

/// A guild's roles as read from the platform at one point in time
///
/// Built fresh for every capture, commit, or audit; never held across calls.
#[derive(Debug, Clone)]
pub struct RoleHierarchy {
    guild_id: GuildId,
    roles: HashMap<RoleId, Role>,
    owner_id: Option<MemberId>,
}

impl RoleHierarchy {
    /// Create a hierarchy from the guild's role list
    pub fn new(guild_id: GuildId, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            guild_id,
            roles: roles.into_iter().map(|r| (r.id.clone(), r)).collect(),
            owner_id: None,
        }
    }

    /// Record the guild owner (owners hold every permission)
    #[must_use]
    pub fn with_owner(mut self, owner_id: MemberId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// The @everyone role, if the platform returned it
    pub fn everyone(&self) -> Option<&Role> {
        self.roles.get(&RoleId::everyone(&self.guild_id))
    }

    /// Position of the member's highest role
    ///
    /// Unknown role ids are ignored; a member with no known roles sits at
    /// [`RolePosition::BASE`].
    pub fn position_of(&self, member: &GuildMember) -> RolePosition {
        member
            .role_ids
            .iter()
            .filter_map(|id| self.roles.get(id))
            .map(|role| role.position)
            .max()
            .map_or(RolePosition::BASE, |top| top.max(RolePosition::BASE))
    }

    /// Effective guild permissions of the member
    pub fn permissions_of(&self, member: &GuildMember) -> Permissions {
        if self.owner_id.as_ref() == Some(&member.user_id) {
            return Permissions::ALL;
        }

        let everyone = self.everyone().map(|r| r.permissions);
        let roles = member
            .role_ids
            .iter()
            .filter_map(|id| self.roles.get(id))
            .map(|r| r.permissions);

        Permissions::combine(everyone.into_iter().chain(roles))
    }

    /// Number of roles in the guild
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
