//! Simulation time model.
//!
//! Time is a monotonically increasing `Tick` counter.  Coordinates carry their
//! time component as a signed `i64` (see [`Coordinate4D`](crate::Coordinate4D))
//! so that query windows can be expressed as plain arithmetic; `Tick` is the
//! unsigned "now" the driving loop advances, and [`Tick::t`] bridges the two.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The tick as a coordinate time component.
    #[inline]
    pub fn t(self) -> i64 {
        self.0 as i64
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
