//! Strongly-typed identifiers.
//!
//! Both identifiers are string-backed: entity ids are chosen by producers
//! (e.g. `"user-1"`), event ids are generated at event construction.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdError;

/// Identifier of the logical entity (aggregate) an event belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

/// Globally unique identifier of a single event.
///
/// Ordering is lexical; storage adapters use it to break `created_at` ties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim().is_empty() {
                    return Err(IdError::new(format!("{}: must not be empty", $name)));
                }
                Ok(Self(s.to_string()))
            }
        }
    };
}

impl_string_newtype!(EntityId, "EntityId");
impl_string_newtype!(EventId, "EventId");

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl EventId {
    /// Generate a fresh identifier.
    ///
    /// Uses UUIDv7 (time-ordered), so ids generated later in a process sort
    /// after earlier ones in the common case.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}
