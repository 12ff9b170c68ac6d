//! Priority-preemptive allocation.

use sky_agent::{Agent, Allocation};
use sky_core::{AStarConfig, Tick};
use sky_env::Environment;

use crate::allocator::{Allocator, Pass, PopOrder};
use crate::bid_tracker::BidTracker;
use crate::error::MechanismResult;
use crate::policy::DisplacementPolicy;

/// Serves the highest bid first and lets it displace any strictly
/// lower-priority holder, which is then re-planned in the same pass.
#[derive(Clone, Debug, Default)]
pub struct PriorityAllocator {
    pub config: AStarConfig,
}

impl PriorityAllocator {
    pub fn new(config: AStarConfig) -> Self {
        Self { config }
    }
}

impl Allocator for PriorityAllocator {
    fn name(&self) -> &'static str {
        "priority"
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
        Pass::new(env, tracker, tick, self.config, DisplacementPolicy::Preemptive, PopOrder::HighestPriority)
            .run(agents)
    }
}
