//! What happened during a run, tick by tick.

use std::time::Duration;

use rustc_hash::FxHashMap;

use sky_agent::Allocation;
use sky_core::{AgentId, Tick};

/// One allocation round.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickRecord {
    pub tick:         Tick,
    pub spawned:      usize,
    pub allocations:  Vec<Allocation>,
    /// Wall time of the round, clone to commit.
    pub compute_time: Duration,
}

impl TickRecord {
    pub fn granted(&self) -> usize {
        self.allocations.iter().filter(|a| !a.is_failure()).count()
    }

    pub fn failed(&self) -> usize {
        self.allocations.iter().filter(|a| a.is_failure()).count()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct History {
    pub ticks:     Vec<TickRecord>,
    /// Cells each path agent would hold with the sky to itself; `None` if
    /// even that fails.
    pub baselines: FxHashMap<AgentId, Option<u64>>,
}

impl History {
    pub fn record(&mut self, record: TickRecord) {
        self.ticks.push(record);
    }

    pub fn tick(&self, tick: Tick) -> Option<&TickRecord> {
        self.ticks.iter().find(|r| r.tick == tick)
    }

    pub fn allocations(&self) -> impl Iterator<Item = &Allocation> + '_ {
        self.ticks.iter().flat_map(|r| r.allocations.iter())
    }

    pub fn total_payment(&self) -> f64 {
        self.allocations().map(|a| a.payment).sum()
    }

    pub fn failures(&self) -> usize {
        self.ticks.iter().map(TickRecord::failed).sum()
    }

    pub fn compute_time(&self) -> Duration {
        self.ticks.iter().map(|r| r.compute_time).sum()
    }

    pub fn baseline(&self, agent: AgentId) -> Option<u64> {
        self.baselines.get(&agent).copied().flatten()
    }
}
