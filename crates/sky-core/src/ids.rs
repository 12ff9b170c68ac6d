//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Agents additionally carry an
//! [`AgentIdentity`] that records whether a value is a speculative clone.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Identifier of a path or space agent, unique across one run.
    pub struct AgentId(u32);
}

typed_id! {
    /// Identifier of a blocker, assigned in insertion order by the blocker index.
    pub struct BlockerId(u32);
}

// ── AgentIdentity ─────────────────────────────────────────────────────────────

/// Identity of an agent value: the live agent it originates from, plus a
/// flag marking speculative copies.
///
/// Equality and hashing look at `origin` only, so a clone and its live agent
/// are interchangeable as map keys.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentIdentity {
    pub origin:   AgentId,
    pub is_clone: bool,
}

impl AgentIdentity {
    pub fn live(origin: AgentId) -> Self {
        Self { origin, is_clone: false }
    }

    /// The identity of a speculative copy of this agent.
    pub fn cloned(self) -> Self {
        Self { origin: self.origin, is_clone: true }
    }
}

impl PartialEq for AgentIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
    }
}

impl Eq for AgentIdentity {}

impl Hash for AgentIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.origin.hash(state);
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clone {
            write!(f, "{}'", self.origin)
        } else {
            write!(f, "{}", self.origin)
        }
    }
}
