//! Per-tick bid memo.
//!
//! Bids are computed on demand from the agent's current state and recorded
//! per `(tick, agent)`.  [`BidTracker::last_bid`] returns the latest
//! recorded bid, computing one only if none exists yet;
//! [`BidTracker::request_new_bid`] always recomputes, which the allocators
//! use after displacing an agent.
//!
//! The tracker also keeps each agent's highest bid priority over the whole
//! run for [`PriorityPaymentRule`](crate::PriorityPaymentRule).

use rustc_hash::FxHashMap;

use sky_agent::{Agent, Bid};
use sky_core::{AgentId, Tick};

#[derive(Clone, Debug, Default)]
pub struct BidTracker {
    bids:         FxHashMap<Tick, FxHashMap<AgentId, Vec<Option<Bid>>>>,
    max_priority: FxHashMap<AgentId, f64>,
}

impl BidTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute a fresh bid and record it.
    pub fn request_new_bid(&mut self, tick: Tick, agent: &Agent) -> Option<Bid> {
        let bid = agent.bid(tick);
        if let Some(b) = &bid {
            let max = self.max_priority.entry(b.agent).or_insert(b.priority);
            *max = max.max(b.priority);
        }
        self.bids.entry(tick).or_default().entry(agent.id()).or_default().push(bid.clone());
        bid
    }

    /// Latest bid recorded for `agent` at `tick`, computed lazily.
    pub fn last_bid(&mut self, tick: Tick, agent: &Agent) -> Option<Bid> {
        let recorded = self.bids.get(&tick).and_then(|m| m.get(&agent.id())).and_then(|v| v.last());
        match recorded {
            Some(bid) => bid.clone(),
            None => self.request_new_bid(tick, agent),
        }
    }

    /// Every bid recorded for `agent` at `tick`, oldest first.
    pub fn bids_for(&self, tick: Tick, agent: AgentId) -> &[Option<Bid>] {
        self.bids.get(&tick).and_then(|m| m.get(&agent)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Current priority of `agent`, `-∞` if it cannot bid.
    pub fn priority(&mut self, tick: Tick, agent: &Agent) -> f64 {
        self.last_bid(tick, agent).map_or(f64::NEG_INFINITY, |b| b.priority)
    }

    /// Highest priority `agent` has ever bid with.
    pub fn max_priority(&self, agent: AgentId) -> Option<f64> {
        self.max_priority.get(&agent).copied()
    }

    /// Forget recorded bids for ticks before `tick`; maximum priorities are kept.
    pub fn prune_before(&mut self, tick: Tick) {
        self.bids.retain(|&t, _| t >= tick);
    }
}
