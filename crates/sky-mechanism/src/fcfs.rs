//! First-come-first-served allocation: arrivals are planned in the order
//! given and granted airspace is never taken back.

use sky_agent::{Agent, Allocation};
use sky_core::{AStarConfig, Tick};
use sky_env::Environment;

use crate::allocator::{Allocator, Pass, PopOrder};
use crate::bid_tracker::BidTracker;
use crate::error::MechanismResult;
use crate::policy::DisplacementPolicy;

#[derive(Clone, Debug, Default)]
pub struct FcfsAllocator {
    pub config: AStarConfig,
}

impl FcfsAllocator {
    pub fn new(config: AStarConfig) -> Self {
        Self { config }
    }
}

impl Allocator for FcfsAllocator {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn astar_config(&self) -> AStarConfig {
        self.config
    }

    fn allocate(
        &mut self,
        agents:  &[Agent],
        env:     &mut Environment,
        tick:    Tick,
        tracker: &mut BidTracker,
    ) -> MechanismResult<Vec<Allocation>> {
        Pass::new(env, tracker, tick, self.config, DisplacementPolicy::NonPreemptive, PopOrder::Arrival).run(agents)
    }
}
