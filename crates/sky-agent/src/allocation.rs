//! Allocation records.
//!
//! An [`Allocation`] is the unit an allocator hands to the environment for
//! commit and to a payment rule for pricing.  A failed attempt is also an
//! `Allocation`, with no segments and reason
//! [`AllocationReason::AllocationFailed`], so a batch's outcomes can be
//! inspected uniformly.

use std::fmt;
use std::time::Duration;

use sky_core::{AgentId, AgentIdentity};

use crate::bid::Bid;
use crate::segment::Segment;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AllocationReason {
    /// The agent arrived this tick.
    FirstAllocation,
    /// The agent was displaced by a higher-priority agent and re-planned.
    Reallocation,
    /// Nothing could be granted.
    AllocationFailed,
}

impl fmt::Display for AllocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AllocationReason::FirstAllocation => "FIRST_ALLOCATION",
            AllocationReason::Reallocation => "REALLOCATION",
            AllocationReason::AllocationFailed => "ALLOCATION_FAILED",
        };
        f.write_str(s)
    }
}

/// How an allocation came about.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationHistory {
    pub bid:          Option<Bid>,
    pub compute_time: Duration,
    pub reason:       AllocationReason,
    pub explanation:  String,
    /// Lower-priority agents this allocation displaced.
    pub displaced:    Vec<AgentId>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allocation {
    pub agent:    AgentIdentity,
    pub segments: Vec<Segment>,
    pub history:  AllocationHistory,
    /// Set by the payment rule after commit.
    pub payment:  f64,
}

impl Allocation {
    pub fn granted(
        agent: AgentIdentity,
        segments: Vec<Segment>,
        bid: Bid,
        reason: AllocationReason,
        compute_time: Duration,
        displaced: Vec<AgentId>,
    ) -> Self {
        Self {
            agent,
            segments,
            history: AllocationHistory {
                bid: Some(bid),
                compute_time,
                reason,
                explanation: String::new(),
                displaced,
            },
            payment: 0.0,
        }
    }

    pub fn failed(agent: AgentIdentity, bid: Option<Bid>, explanation: impl Into<String>, compute_time: Duration) -> Self {
        Self {
            agent,
            segments: Vec::new(),
            history: AllocationHistory {
                bid,
                compute_time,
                reason: AllocationReason::AllocationFailed,
                explanation: explanation.into(),
                displaced: Vec::new(),
            },
            payment: 0.0,
        }
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent.origin
    }

    pub fn is_failure(&self) -> bool {
        self.history.reason == AllocationReason::AllocationFailed
    }

    pub fn voxels(&self) -> u64 {
        self.segments.iter().map(Segment::voxels).sum()
    }

    /// The same allocation attributed to the live agent `agent`.
    pub fn for_live_agent(mut self, agent: AgentIdentity) -> Self {
        self.agent = agent;
        self
    }
}
