//! "Alone in the sky": how much airspace a new path agent would get if no
//! other agent existed.
//!
//! Each agent is planned on its own [`Environment::new_clear`], which shares
//! only the blocker index, so the computations are independent and run on
//! Rayon's pool with the `parallel` feature.

use sky_agent::Agent;
use sky_core::{AStarConfig, AgentId, Tick};
use sky_env::Environment;
use sky_mechanism::{Allocator, BidTracker, PriorityAllocator};

use crate::error::SimResult;

/// Granted cells per path agent in `agents`; space agents are skipped.
pub fn alone_in_the_sky(
    env:    &Environment,
    agents: &[Agent],
    tick:   Tick,
    config: AStarConfig,
) -> SimResult<Vec<(AgentId, Option<u64>)>> {
    let paths: Vec<&Agent> = agents.iter().filter(|a| a.as_path().is_some()).collect();

    #[cfg(not(feature = "parallel"))]
    {
        paths.into_iter().map(|a| baseline_for(env, a, tick, config)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        paths.into_par_iter().map(|a| baseline_for(env, a, tick, config)).collect()
    }
}

fn baseline_for(env: &Environment, agent: &Agent, tick: Tick, config: AStarConfig) -> SimResult<(AgentId, Option<u64>)> {
    let mut clear = env.new_clear();
    let mut tracker = BidTracker::new();
    let out = PriorityAllocator::new(config).allocate(&[agent.speculative_clone()], &mut clear, tick, &mut tracker)?;
    let cells = out.iter().find(|a| !a.is_failure()).map(|a| a.voxels());
    Ok((agent.id(), cells))
}
