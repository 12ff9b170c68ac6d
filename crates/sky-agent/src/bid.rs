//! Bids: an agent's declared demand and priority at one tick.
//!
//! A bid is computed from the agent's itinerary and what it has already been
//! granted (see [`PathAgent::bid`](crate::PathAgent::bid)), and is immutable
//! afterwards.

use sky_core::{AgentId, Coordinate4D};

use crate::segment::SpaceSegment;

/// Remaining itinerary of a path agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathBid {
    /// Where (and earliest when) the next leg departs.
    pub start:     Coordinate4D,
    /// Remaining stops; `t` is the desired arrival tick.
    pub targets:   Vec<Coordinate4D>,
    /// Ground dwell after each remaining leg, in ticks.
    pub stays:     Vec<i64>,
    /// Flight ticks still available.
    pub battery:   i64,
    /// The agent is airborne at `start`, which is then pinned to the bid tick.
    pub flying:    bool,
    /// Leg number of the first remaining leg.
    pub start_leg: usize,
}

impl PathBid {
    pub fn stay_after(&self, leg: usize) -> i64 {
        self.stays.get(leg).copied().unwrap_or(0)
    }
}

/// Remaining reservation boxes of a space agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpaceBid {
    pub blocks: Vec<SpaceSegment>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BidDemand {
    Path(PathBid),
    Space(SpaceBid),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bid {
    pub agent:    AgentId,
    pub priority: f64,
    pub demand:   BidDemand,
}

impl Bid {
    /// Strictly higher priority.
    #[inline]
    pub fn outranks(&self, other: &Bid) -> bool {
        self.priority > other.priority
    }

    pub fn is_flying(&self) -> bool {
        matches!(&self.demand, BidDemand::Path(p) if p.flying)
    }
}
