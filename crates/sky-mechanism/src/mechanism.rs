//! An allocator paired with a payment rule.

use tracing::debug;

use sky_agent::{Agent, Allocation};
use sky_core::{AStarConfig, Tick};
use sky_env::Environment;

use crate::allocator::Allocator;
use crate::bid_tracker::BidTracker;
use crate::error::MechanismResult;
use crate::fcfs::FcfsAllocator;
use crate::payment::{PaymentRule, PriorityPaymentRule, VoxelPaymentRule};
use crate::priority::PriorityAllocator;

/// Runs one allocation round as a two-phase commit and prices the result.
///
/// ```text
/// clone  ← env.speculative_clone()
/// trial  ← allocator.allocate(new agents as clones, clone, tick)
/// result ← env.commit(trial, new agents, tick)
/// stamp payment on every record in result
/// ```
pub struct Mechanism {
    allocator: Box<dyn Allocator>,
    payment:   Box<dyn PaymentRule>,
    tracker:   BidTracker,
}

impl Mechanism {
    pub fn new(allocator: impl Allocator + 'static, payment: impl PaymentRule + 'static) -> Self {
        Self { allocator: Box::new(allocator), payment: Box::new(payment), tracker: BidTracker::new() }
    }

    /// Priority-preemptive allocation, charged by voxels × max priority.
    pub fn priority(config: AStarConfig, price_per_voxel: f64) -> Self {
        Self::new(PriorityAllocator::new(config), PriorityPaymentRule::new(price_per_voxel))
    }

    /// First-come-first-served allocation, charged by voxels.
    pub fn fcfs(config: AStarConfig, price_per_voxel: f64) -> Self {
        Self::new(FcfsAllocator::new(config), VoxelPaymentRule::new(price_per_voxel))
    }

    pub fn name(&self) -> &'static str {
        self.allocator.name()
    }

    /// Search settings of the allocator, reused for baseline plans.
    pub fn astar_config(&self) -> AStarConfig {
        self.allocator.astar_config()
    }

    pub fn tracker(&self) -> &BidTracker {
        &self.tracker
    }

    pub fn wants_to_reallocate(&self, env: &Environment, tick: Tick) -> bool {
        self.allocator.wants_to_reallocate(env, tick)
    }

    /// Allocate `new_agents` arriving at `tick` and commit the result to `env`.
    ///
    /// Every agent in `new_agents` ends up registered in `env`, granted or not.
    pub fn allocate(&mut self, new_agents: Vec<Agent>, env: &mut Environment, tick: Tick) -> MechanismResult<Vec<Allocation>> {
        self.tracker.prune_before(tick);
        let mut trial_env = env.speculative_clone();
        let clones: Vec<Agent> = new_agents.iter().map(Agent::speculative_clone).collect();
        let trial = self.allocator.allocate(&clones, &mut trial_env, tick, &mut self.tracker)?;
        drop(trial_env);

        let mut committed = env.commit(trial, new_agents, tick)?;
        let payments = self.payment.payments(&committed, &self.tracker);
        for allocation in &mut committed {
            allocation.payment = payments.get(&allocation.agent_id()).copied().unwrap_or(0.0);
        }
        debug!(%tick, mechanism = self.name(), allocations = committed.len(), "round committed");
        Ok(committed)
    }
}
