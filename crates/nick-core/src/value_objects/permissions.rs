//! Permissions bitflags
//!
//! Bit values follow the platform's wire format so role payloads can be
//! decoded without translation. Only the flags the bot reasons about are
//! named; unknown bits are kept when parsing.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Guild permission flags
    ///
    /// Serialized as a decimal string in JSON, matching the platform payloads.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// Kick members from guild
        const KICK_MEMBERS     = 1 << 1;
        /// Ban members from guild
        const BAN_MEMBERS      = 1 << 2;
        /// Bypass all permission checks
        const ADMINISTRATOR    = 1 << 3;
        /// Create, edit, delete channels
        const MANAGE_CHANNELS  = 1 << 4;
        /// Edit guild settings
        const MANAGE_GUILD     = 1 << 5;
        /// View channel and read messages
        const VIEW_CHANNEL     = 1 << 10;
        /// Send messages in text channels
        const SEND_MESSAGES    = 1 << 11;
        /// Delete other users' messages
        const MANAGE_MESSAGES  = 1 << 13;
        /// Upload files and images
        const ATTACH_FILES     = 1 << 15;
        /// Change own nickname
        const CHANGE_NICKNAME  = 1 << 26;
        /// Change other members' nicknames
        const MANAGE_NICKNAMES = 1 << 27;
        /// Create, edit, delete, assign roles
        const MANAGE_ROLES     = 1 << 28;

        /// What the bot needs to run its commands in a guild
        const BOT_REQUIRED = Self::MANAGE_NICKNAMES.bits()
            | Self::MANAGE_ROLES.bits()
            | Self::ATTACH_FILES.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::VIEW_CHANNEL.bits();

        /// All permissions (for guild owners)
        const ALL = u64::MAX;
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Permissions from `required` that this set lacks (empty for administrators)
    pub fn missing(&self, required: Permissions) -> Permissions {
        if self.contains(Permissions::ADMINISTRATOR) {
            return Permissions::empty();
        }
        required.difference(*self)
    }

    /// Combine permissions from multiple roles
    pub fn combine<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Permissions>,
    {
        roles.into_iter().fold(Permissions::empty(), |acc, p| acc | p)
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_retain)
    }

    /// Names of the named permissions that are set
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names()
            .filter(|(_, flag)| flag.bits().count_ones() == 1)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.list().join(" | "))
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl<'de> Visitor<'de> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permissions")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_retain(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Permissions::parse(value).map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}
