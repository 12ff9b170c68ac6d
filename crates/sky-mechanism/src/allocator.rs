//! The allocator protocol.
//!
//! Both allocators run the same worklist pass and differ only in pop order
//! and [`DisplacementPolicy`]:
//!
//! ```text
//! worklist ← arrivals
//! while let Some(agent) = pop(worklist):
//!   bid ← tracker.last_bid(tick, agent)       none → ALLOCATION_FAILED
//!   path bid  → each leg: first free start tick, A*, check battery
//!   space bid → each box: clamp to tick + 1, check blockers and occupants
//!   failure   → ALLOCATION_FAILED with explanation
//!   success   → deallocate every displaced agent at tick, re-bid it,
//!               drop its earlier record, push it back on the worklist;
//!               then commit the agent's segments
//! ```
//!
//! The pass runs against whatever environment it is handed; the
//! [`Mechanism`](crate::Mechanism) gives it a speculative clone.

use std::collections::VecDeque;
use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use sky_agent::{
    Agent, Allocation, AllocationReason, Bid, BidDemand, PathAgent, PathBid, PathSegment, Segment, SpaceBid,
    SpaceSegment,
};
use sky_core::{AStarConfig, AgentId, Tick};
use sky_env::Environment;

use crate::astar::AStar;
use crate::bid_tracker::BidTracker;
use crate::error::{MechanismError, MechanismResult};
use crate::policy::DisplacementPolicy;

// ── Allocator trait ───────────────────────────────────────────────────────────

pub trait Allocator: Send {
    fn name(&self) -> &'static str;

    /// Search settings every path is planned with.
    fn astar_config(&self) -> AStarConfig;

    /// Allocate the tick's arrivals in `env`, displacing and re-planning
    /// existing agents as the allocator's policy allows.
    ///
    /// Agents in `agents` that `env` already knows are re-planned from
    /// `tick` on.
    fn allocate(
        &mut self,
        agents:  &[Agent],
        env:     &mut Environment,
        tick:    Tick,
        tracker: &mut BidTracker,
    ) -> MechanismResult<Vec<Allocation>>;

    /// Whether a pass should run at `tick` even with no arrivals.
    fn wants_to_reallocate(&self, _env: &Environment, _tick: Tick) -> bool {
        false
    }
}

// ── Pass ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum PopOrder {
    /// Highest current bid priority first; ties go to the lower id.
    HighestPriority,
    /// Worklist order.
    Arrival,
}

enum Outcome {
    Granted { segments: Vec<Segment>, displaced: Vec<AgentId> },
    Failed(String),
}

pub(crate) struct Pass<'a> {
    env:     &'a mut Environment,
    tracker: &'a mut BidTracker,
    tick:    Tick,
    config:  AStarConfig,
    policy:  DisplacementPolicy,
    order:   PopOrder,
}

impl<'a> Pass<'a> {
    pub(crate) fn new(
        env:     &'a mut Environment,
        tracker: &'a mut BidTracker,
        tick:    Tick,
        config:  AStarConfig,
        policy:  DisplacementPolicy,
        order:   PopOrder,
    ) -> Self {
        Self { env, tracker, tick, config, policy, order }
    }

    pub(crate) fn run(mut self, agents: &[Agent]) -> MechanismResult<Vec<Allocation>> {
        let tick = self.tick;
        let mut pending: FxHashMap<AgentId, Agent> = FxHashMap::default();
        let mut arrivals: FxHashSet<AgentId> = FxHashSet::default();
        let mut queue: VecDeque<AgentId> = VecDeque::with_capacity(agents.len());

        for agent in agents {
            let id = agent.id();
            if queue.contains(&id) {
                continue;
            }
            if self.env.contains(id) {
                self.env.deallocate_agent(id, tick)?;
                let known = self.env.agent(id).ok_or(MechanismError::UnknownAgent(id))?;
                self.tracker.request_new_bid(tick, known);
            } else {
                pending.insert(id, agent.clone());
                arrivals.insert(id);
            }
            queue.push_back(id);
        }

        let mut out: Vec<Allocation> = Vec::new();
        while let Some(id) = self.pop(&mut queue, &pending)? {
            let started = Instant::now();
            let agent = match pending.get(&id) {
                Some(a) => a.clone(),
                None => self.env.agent(id).ok_or(MechanismError::UnknownAgent(id))?.clone(),
            };

            let Some(bid) = self.tracker.last_bid(tick, &agent) else {
                debug!(agent = %id, %tick, "nothing left to bid for");
                out.push(Allocation::failed(agent.identity(), None, "agent has nothing left to bid for", started.elapsed()));
                continue;
            };

            let outcome = match (&agent, &bid.demand) {
                (Agent::Path(a), BidDemand::Path(p)) => self.plan_path(a, &bid, p)?,
                (Agent::Space(_), BidDemand::Space(s)) => self.plan_space(id, &bid, s)?,
                (a, d) => {
                    return Err(MechanismError::BidMismatch {
                        agent:      id,
                        agent_kind: a.kind(),
                        bid_kind:   match d {
                            BidDemand::Path(_) => "path",
                            BidDemand::Space(_) => "space",
                        },
                    });
                }
            };

            match outcome {
                Outcome::Failed(explanation) => {
                    debug!(agent = %id, %tick, %explanation, "allocation failed");
                    out.push(Allocation::failed(agent.identity(), Some(bid), explanation, started.elapsed()));
                }
                Outcome::Granted { segments, displaced } => {
                    for &other in &displaced {
                        self.env.deallocate_agent(other, tick)?;
                        let other_agent = self.env.agent(other).ok_or(MechanismError::UnknownAgent(other))?;
                        self.tracker.request_new_bid(tick, other_agent);
                        out.retain(|a| a.agent_id() != other);
                        if !queue.contains(&other) {
                            queue.push_back(other);
                        }
                        debug!(agent = %other, by = %id, %tick, "displaced");
                    }
                    if let Some(new) = pending.remove(&id) {
                        self.env.add_agent(new)?;
                    }
                    self.env.allocate_segments(id, segments.clone())?;
                    let reason = if arrivals.contains(&id) {
                        AllocationReason::FirstAllocation
                    } else {
                        AllocationReason::Reallocation
                    };
                    out.push(Allocation::granted(agent.identity(), segments, bid, reason, started.elapsed(), displaced));
                }
            }
        }
        Ok(out)
    }

    fn pop(&mut self, queue: &mut VecDeque<AgentId>, pending: &FxHashMap<AgentId, Agent>) -> MechanismResult<Option<AgentId>> {
        if self.order == PopOrder::Arrival {
            return Ok(queue.pop_front());
        }
        let mut best: Option<(usize, f64, AgentId)> = None;
        for (pos, &id) in queue.iter().enumerate() {
            let agent = match pending.get(&id) {
                Some(a) => a,
                None => self.env.agent(id).ok_or(MechanismError::UnknownAgent(id))?,
            };
            let priority = self.tracker.priority(self.tick, agent);
            let better = match best {
                None => true,
                Some((_, p, b)) => priority > p || (priority == p && id < b),
            };
            if better {
                best = Some((pos, priority, id));
            }
        }
        Ok(best.and_then(|(pos, _, _)| queue.remove(pos)))
    }

    // ── Path bids ─────────────────────────────────────────────────────────

    fn plan_path(&mut self, agent: &PathAgent, bid: &Bid, demand: &PathBid) -> MechanismResult<Outcome> {
        let tick = self.tick;
        let horizon = self.env.dimension().t;
        let mut segments = Vec::with_capacity(demand.targets.len());
        let mut displaced = Vec::new();
        let mut flight = 0;
        let mut start = demand.start;

        for (i, &target) in demand.targets.iter().enumerate() {
            if self.env.is_blocked_forever(target, agent.near_radius) {
                return Ok(Outcome::Failed(format!("stop {} is permanently blocked", target.to_3d())));
            }
            let mut astar = AStar::new(self.env, self.tracker, tick, self.config, self.policy);

            if i == 0 && demand.flying {
                if astar.validate(start, agent, bid)?.is_none() {
                    return Ok(Outcome::Failed(format!("mid-flight position {start} is taken")));
                }
            } else {
                start.t = start.t.max(tick.t() + 1);
                loop {
                    if start.t > horizon {
                        return Ok(Outcome::Failed(format!("no free departure from {} before the horizon", start.to_3d())));
                    }
                    if astar.validate(start, agent, bid)?.is_some() {
                        break;
                    }
                    start.t += 1;
                }
            }

            let Some(result) = astar.search(start, target, agent, bid)? else {
                return Ok(Outcome::Failed(format!("no path from {start} to {}", target.to_3d())));
            };
            let (Some(&first), Some(&last)) = (result.path.first(), result.path.last()) else {
                return Ok(Outcome::Failed(format!("empty path from {start} to {}", target.to_3d())));
            };
            flight += last.t - first.t;
            if flight > demand.battery {
                return Ok(Outcome::Failed(format!("needs {flight} ticks of flight, battery holds {}", demand.battery)));
            }

            displaced.extend(result.collisions);
            let leg = demand.start_leg + i;
            segments.push(Segment::Path(PathSegment::new(start.to_3d(), target.to_3d(), leg, result.path)));
            start = last.with_t(last.t + 1 + demand.stay_after(i));
        }

        displaced.sort_unstable();
        displaced.dedup();
        Ok(Outcome::Granted { segments, displaced })
    }

    // ── Space bids ────────────────────────────────────────────────────────

    fn plan_space(&mut self, id: AgentId, bid: &Bid, demand: &SpaceBid) -> MechanismResult<Outcome> {
        let earliest = self.tick.t() + 1;
        let mut segments = Vec::new();
        let mut displaced = Vec::new();
        let mut refused = Vec::new();

        'boxes: for block in &demand.blocks {
            let mut min = block.min;
            min.t = min.t.max(earliest);
            if min.t > block.max.t {
                continue;
            }
            if self.env.is_box_blocked(min, block.max) {
                refused.push(format!("box {} is blocked", block.index));
                continue;
            }
            let occupants = self.env.other_agents_in_box(min, block.max, id);
            for &other in &occupants {
                let other_agent = self.env.agent(other).ok_or(MechanismError::UnknownAgent(other))?;
                let other_bid = self.tracker.last_bid(self.tick, other_agent).ok_or(MechanismError::StuckAgent(other))?;
                if !self.policy.may_displace(bid, &other_bid) {
                    refused.push(format!("box {} is held by {other}", block.index));
                    continue 'boxes;
                }
            }
            segments.push(Segment::Space(SpaceSegment::new(min, block.max, block.index)));
            displaced.extend(occupants);
        }

        if segments.is_empty() {
            let explanation = if refused.is_empty() {
                format!("no box reaches past {}", self.tick)
            } else {
                refused.join("; ")
            };
            return Ok(Outcome::Failed(explanation));
        }
        displaced.sort_unstable();
        displaced.dedup();
        Ok(Outcome::Granted { segments, displaced })
    }
}
