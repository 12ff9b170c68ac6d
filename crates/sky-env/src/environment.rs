//! Authoritative world state.
//!
//! # Ownership
//!
//! | Part              | Sharing                                               |
//! |-------------------|-------------------------------------------------------|
//! | `BlockerIndex`    | read-only, shared by every clone via `Arc`            |
//! | allocation index  | exclusively owned, deep-copied by `speculative_clone` |
//! | agent registry    | exclusively owned, deep-copied by `speculative_clone` |
//!
//! # Two-phase commit
//!
//! An allocator works on [`Environment::speculative_clone`], whose agents
//! carry clone identities.  Only [`Environment::commit`] touches the live
//! environment: it registers the tick's new agents, resets every agent named
//! in the allocations to its elapsed past and applies the granted segments.
//! Dropping the clone is the rollback.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use sky_agent::{Agent, Allocation, PathAgent, PathSegment, Segment, SpaceSegment};
use sky_core::{AgentId, Coordinate4D, Tick, WorldConfig};
use sky_spatial::{Blocker, BlockerIndex, Interval4, SpatialIndex};

use crate::collision::{collides_with_box, collides_with_cell};
use crate::error::{EnvError, EnvResult};

pub struct Environment {
    dimension:         Coordinate4D,
    min_height:        i64,
    allocation_period: u64,
    blockers:          Arc<BlockerIndex>,
    index:             SpatialIndex<AgentId>,
    agents:            FxHashMap<AgentId, Agent>,
    /// Largest near radius of any registered path agent.
    max_near_radius:   i64,
}

impl Environment {
    pub fn new(blockers: Arc<BlockerIndex>, min_height: i64) -> Self {
        Self {
            dimension: blockers.dimension(),
            min_height,
            allocation_period: 1,
            blockers,
            index: SpatialIndex::new(),
            agents: FxHashMap::default(),
            max_near_radius: 0,
        }
    }

    pub fn from_config(config: &WorldConfig) -> EnvResult<Self> {
        let blockers = BlockerIndex::from_config(config)?;
        let mut env = Self::new(Arc::new(blockers), config.min_height);
        env.allocation_period = config.allocation_period;
        Ok(env)
    }

    /// A fresh environment sharing only the blocker index.
    pub fn new_clear(&self) -> Self {
        let mut env = Self::new(Arc::clone(&self.blockers), self.min_height);
        env.allocation_period = self.allocation_period;
        env
    }

    /// Deep copy of the allocation state with every agent marked as a clone.
    pub fn speculative_clone(&self) -> Self {
        Self {
            dimension:         self.dimension,
            min_height:        self.min_height,
            allocation_period: self.allocation_period,
            blockers:          Arc::clone(&self.blockers),
            index:             self.index.clone(),
            agents:            self.agents.iter().map(|(&id, a)| (id, a.speculative_clone())).collect(),
            max_near_radius:   self.max_near_radius,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn dimension(&self) -> Coordinate4D {
        self.dimension
    }

    pub fn min_height(&self) -> i64 {
        self.min_height
    }

    pub fn allocation_period(&self) -> u64 {
        self.allocation_period
    }

    pub fn blocker_index(&self) -> &Arc<BlockerIndex> {
        &self.blockers
    }

    pub fn max_near_radius(&self) -> i64 {
        self.max_near_radius
    }

    /// Number of allocation-index entries.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// `0 ≤ x < dim.x` (likewise `y`, `z`) and `0 ≤ t ≤ dim.t`.
    pub fn in_bounds(&self, c: Coordinate4D) -> bool {
        let d = self.dimension;
        (0..d.x).contains(&c.x)
            && (0..d.y).contains(&c.y)
            && (0..d.z).contains(&c.z)
            && (0..=d.t).contains(&c.t)
    }

    // ── Agent registry ────────────────────────────────────────────────────

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Registered agents in id order.
    pub fn agents(&self) -> Vec<&Agent> {
        let mut out: Vec<&Agent> = self.agents.values().collect();
        out.sort_unstable_by_key(|a| a.id());
        out
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn add_agent(&mut self, agent: Agent) -> EnvResult<()> {
        let id = agent.id();
        if self.agents.contains_key(&id) {
            return Err(EnvError::DuplicateAgent(id));
        }
        self.max_near_radius = self.max_near_radius.max(agent.near_radius());
        self.agents.insert(id, agent);
        Ok(())
    }

    fn agent_mut(&mut self, id: AgentId) -> EnvResult<&mut Agent> {
        self.agents.get_mut(&id).ok_or(EnvError::UnknownAgent(id))
    }

    // ── Blocker queries ───────────────────────────────────────────────────

    pub fn blockers_at(&self, coord: Coordinate4D, radius: i64, speed: i64) -> Vec<&Blocker> {
        self.blockers.blockers_at(coord, radius, speed)
    }

    /// A blocker touches `coord ± near_radius` during `[t, t + speed]`.
    pub fn is_blocked(&self, coord: Coordinate4D, agent: &PathAgent) -> bool {
        self.blockers.is_blocked(coord, agent.near_radius, agent.speed)
    }

    pub fn is_blocked_forever(&self, coord: Coordinate4D, radius: i64) -> bool {
        self.blockers.is_blocked_forever(coord, radius)
    }

    pub fn is_box_blocked(&self, min: Coordinate4D, max: Coordinate4D) -> bool {
        self.blockers.is_box_blocked(min, max)
    }

    pub fn is_box_blocked_forever(&self, min: Coordinate4D, max: Coordinate4D) -> bool {
        self.blockers.is_box_blocked_forever(min, max)
    }

    // ── Agent collision queries ───────────────────────────────────────────

    /// Other agents whose index entries overlap the cube around `coord`
    /// during the ticks it is occupied.  Bounding-box pre-filter only.
    pub fn intersect(&self, coord: Coordinate4D, agent: &PathAgent) -> FxHashSet<AgentId> {
        let radius = agent.near_radius.max(self.max_near_radius);
        let window = Interval4::around(coord, radius, agent.speed - 1);
        let mut ids = self.index.keys_in(&window);
        ids.remove(&agent.id());
        ids
    }

    /// Other agents that truly conflict with `agent` at `coord`, in id order.
    pub fn colliding_agents(&self, coord: Coordinate4D, agent: &PathAgent) -> Vec<AgentId> {
        let mut out: Vec<AgentId> = self
            .intersect(coord, agent)
            .into_iter()
            .filter(|id| {
                self.agents
                    .get(id)
                    .is_some_and(|other| collides_with_cell(other, coord, agent.near_radius, agent.speed))
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Other agents that truly conflict with the box `[min, max]`, in id order.
    pub fn other_agents_in_box(&self, min: Coordinate4D, max: Coordinate4D, exclude: AgentId) -> Vec<AgentId> {
        let r = self.max_near_radius;
        let window = Interval4::new(
            Coordinate4D::new(min.x - r, min.y - r, min.z - r, min.t),
            Coordinate4D::new(max.x + r, max.y + r, max.z + r, max.t),
        );
        let mut out: Vec<AgentId> = self
            .index
            .keys_in(&window)
            .into_iter()
            .filter(|&id| id != exclude)
            .filter(|id| self.agents.get(id).is_some_and(|other| collides_with_box(other, min, max)))
            .collect();
        out.sort_unstable();
        out
    }

    // ── Allocation ────────────────────────────────────────────────────────

    /// Index one path segment as runs of identical cells, then hand it to
    /// the agent.
    pub fn allocate_path_segment(&mut self, id: AgentId, segment: PathSegment) -> EnvResult<()> {
        let mut runs = Vec::new();
        let mut cells = segment.coordinates.iter().copied();
        if let Some(first) = cells.next() {
            let (mut run_start, mut run_end) = (first, first);
            for cell in cells {
                if cell.inter_temporal_eq(run_start) {
                    run_end = cell;
                } else {
                    runs.push(Interval4::new(run_start, run_end));
                    run_start = cell;
                    run_end = cell;
                }
            }
            runs.push(Interval4::new(run_start, run_end));
        }
        self.agent_mut(id)?.add_allocated_segment(Segment::Path(segment))?;
        for run in runs {
            self.index.insert(id, run);
        }
        Ok(())
    }

    pub fn allocate_space_segment(&mut self, id: AgentId, segment: SpaceSegment) -> EnvResult<()> {
        self.agent_mut(id)?.add_allocated_segment(Segment::Space(segment))?;
        self.index.insert(id, Interval4::new(segment.min, segment.max));
        Ok(())
    }

    pub fn allocate_segments(&mut self, id: AgentId, segments: Vec<Segment>) -> EnvResult<()> {
        for segment in segments {
            match segment {
                Segment::Path(s) => self.allocate_path_segment(id, s)?,
                Segment::Space(s) => self.allocate_space_segment(id, s)?,
            }
        }
        Ok(())
    }

    /// Drop everything `id` holds at or after `tick`; the elapsed part of a
    /// straddling segment is kept.
    pub fn deallocate_agent(&mut self, id: AgentId, tick: Tick) -> EnvResult<()> {
        let t = tick.t();
        let removed = self.index.truncate_from(id, t);
        match self.agent_mut(id)? {
            Agent::Path(a) => {
                let segments = std::mem::take(&mut a.allocated_segments);
                for seg in segments {
                    if seg.max().t < t {
                        a.allocated_segments.push(seg);
                    } else if seg.min().t < t {
                        a.allocated_segments.push(seg.split_temporal(t - 1).0);
                    }
                }
            }
            Agent::Space(a) => {
                let segments = std::mem::take(&mut a.allocated_segments);
                for seg in segments {
                    if seg.max.t < t {
                        a.allocated_segments.push(seg);
                    } else if seg.min.t < t {
                        a.allocated_segments.push(seg.split_temporal(t - 1).0);
                    }
                }
            }
        }
        trace!(agent = %id, %tick, removed, "deallocated");
        Ok(())
    }

    // ── Commit ────────────────────────────────────────────────────────────

    /// Apply allocations computed on a speculative clone to this (live)
    /// environment and return them attributed to the live agents.
    ///
    /// Every agent in `new_agents` is registered, whether or not it was
    /// granted anything.
    pub fn commit(
        &mut self,
        allocations: Vec<Allocation>,
        new_agents: Vec<Agent>,
        tick: Tick,
    ) -> EnvResult<Vec<Allocation>> {
        for agent in new_agents {
            self.add_agent(agent)?;
        }

        let mut committed = Vec::with_capacity(allocations.len());
        for allocation in allocations {
            let id = allocation.agent_id();
            let live = self.agent(id).ok_or(EnvError::UnknownAgent(id))?.identity();
            self.deallocate_agent(id, tick)?;
            self.allocate_segments(id, allocation.segments.clone())?;
            committed.push(allocation.for_live_agent(live));
        }
        debug!(%tick, committed = committed.len(), agents = self.agents.len(), "commit");
        Ok(committed)
    }
}
