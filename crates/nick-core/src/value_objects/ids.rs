//! Platform identifiers
//!
//! Guild, member, and role ids are opaque to the engine. The platform hands
//! them out as decimal strings, but nothing here depends on that: an id is any
//! non-empty run of ASCII letters, digits, `-` or `_` (at most 64 characters).
//! The restricted alphabet keeps ids safe to embed in snapshot file names.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Maximum accepted id length
pub const MAX_ID_LEN: usize = 64;

/// Error when parsing an id from a string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("id must not be empty")]
    Empty,

    #[error("id exceeds {MAX_ID_LEN} characters")]
    TooLong,

    #[error("id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

fn validate(raw: &str) -> Result<(), IdParseError> {
    if raw.is_empty() {
        return Err(IdParseError::Empty);
    }
    if raw.len() > MAX_ID_LEN {
        return Err(IdParseError::TooLong);
    }
    match raw
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        Some(c) => Err(IdParseError::InvalidCharacter(c)),
        None => Ok(()),
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $expecting:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an id
            pub fn parse(raw: &str) -> Result<Self, IdParseError> {
                validate(raw)?;
                Ok(Self(raw.to_owned()))
            }

            /// Borrow the raw id
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        // Accepts strings (including JSON object keys) and unsigned integers
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                use serde::de::{self, Visitor};

                struct IdVisitor;

                impl<'de> Visitor<'de> for IdVisitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str($expecting)
                    }

                    fn visit_u64<E>(self, value: u64) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        Ok($name(value.to_string()))
                    }

                    fn visit_str<E>(self, value: &str) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        $name::parse(value).map_err(de::Error::custom)
                    }
                }

                deserializer.deserialize_any(IdVisitor)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a guild (server)
    GuildId,
    "a string or integer guild id"
);

opaque_id!(
    /// Identifier of a member within a guild (the member's user id)
    MemberId,
    "a string or integer member id"
);

opaque_id!(
    /// Identifier of a guild role
    RoleId,
    "a string or integer role id"
);

impl RoleId {
    /// The @everyone role shares its id with the guild
    pub fn everyone(guild_id: &GuildId) -> Self {
        Self(guild_id.as_str().to_owned())
    }
}
