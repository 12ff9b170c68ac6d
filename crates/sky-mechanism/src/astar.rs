//! Time-expanded A* over the voxel grid.
//!
//! # Search graph
//!
//! A node is a 4-D cell.  Each node has seven successors: wait in place and
//! one step along ±x, ±y, ±z.  Every successor is `speed` ticks later.  The
//! goal test ignores time, so the first node popped at the destination cell
//! ends the search.
//!
//! | Term | Value                                                        |
//! |------|--------------------------------------------------------------|
//! | `g`  | `parent.g + step_cost`                                       |
//! | `h`  | Euclidean distance to the goal cell                          |
//! | `f`  | `g + h − (y / dim.y) · height_adjust · h`                    |
//!
//! All successors of a node share one depth and `g` is a function of depth
//! alone, so the first parent recorded for a cell is as good as any later
//! one; cells are marked seen when first generated.
//!
//! # Validity
//!
//! A cell is usable if it is inside the world, not blocked, and every agent
//! truly colliding with it may be displaced under the allocator's
//! [`DisplacementPolicy`].  Displaceable occupants are collected along the
//! path and handed back with the result.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;
use tracing::trace;

use sky_agent::{Bid, BidDemand, PathAgent};
use sky_core::{AStarConfig, AgentId, Coordinate3D, Coordinate4D, Tick};
use sky_env::Environment;

use crate::bid_tracker::BidTracker;
use crate::error::{MechanismError, MechanismResult};
use crate::policy::DisplacementPolicy;

const MOVES: [Coordinate3D; 7] = [
    Coordinate3D::new(0, 0, 0),
    Coordinate3D::new(1, 0, 0),
    Coordinate3D::new(-1, 0, 0),
    Coordinate3D::new(0, 1, 0),
    Coordinate3D::new(0, -1, 0),
    Coordinate3D::new(0, 0, 1),
    Coordinate3D::new(0, 0, -1),
];

// ── Heap key ──────────────────────────────────────────────────────────────────

/// `f64` ordered by `total_cmp`, so it can sit in a `BinaryHeap`.
#[derive(Copy, Clone, Debug)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

struct Node {
    position:   Coordinate4D,
    parent:     Option<usize>,
    g:          f64,
    collisions: Vec<AgentId>,
}

// ── Result ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// One cell per tick from start to arrival, waits included.
    pub path:       Vec<Coordinate4D>,
    /// Displaceable agents the path runs into, in id order.
    pub collisions: Vec<AgentId>,
    /// Nodes popped before the goal was reached.
    pub expanded:   usize,
}

// ── AStar ─────────────────────────────────────────────────────────────────────

pub struct AStar<'a> {
    env:     &'a Environment,
    tracker: &'a mut BidTracker,
    tick:    Tick,
    config:  AStarConfig,
    policy:  DisplacementPolicy,
}

impl<'a> AStar<'a> {
    pub fn new(
        env:     &'a Environment,
        tracker: &'a mut BidTracker,
        tick:    Tick,
        config:  AStarConfig,
        policy:  DisplacementPolicy,
    ) -> Self {
        Self { env, tracker, tick, config, policy }
    }

    /// Agents `agent` would displace at `position`, or `None` if the cell is
    /// unusable.
    ///
    /// A cell at the current tick is only usable as the mid-flight start of
    /// a flying bid.
    pub fn validate(
        &mut self,
        position: Coordinate4D,
        agent:    &PathAgent,
        bid:      &Bid,
    ) -> MechanismResult<Option<Vec<AgentId>>> {
        let now = self.tick.t();
        if position.t < now {
            return Err(MechanismError::PastTick { position, tick: self.tick });
        }
        if !self.env.in_bounds(position) || self.env.is_blocked(position, agent) {
            return Ok(None);
        }
        if position.t == now {
            let pinned = match &bid.demand {
                BidDemand::Path(p) => p.flying && p.start == position,
                BidDemand::Space(_) => false,
            };
            if !pinned {
                return Ok(None);
            }
        }

        let mut displaced = Vec::new();
        for other_id in self.env.colliding_agents(position, agent) {
            let other = self.env.agent(other_id).ok_or(MechanismError::UnknownAgent(other_id))?;
            let other_bid = self.tracker.last_bid(self.tick, other).ok_or(MechanismError::StuckAgent(other_id))?;
            if !self.policy.may_displace(bid, &other_bid) {
                return Ok(None);
            }
            displaced.push(other_id);
        }
        Ok(Some(displaced))
    }

    /// Shortest valid path from `start` to the cell of `goal`.
    ///
    /// `Ok(None)` when the start is unusable, the goal is out of reach before
    /// the world's time horizon, or `max_iter` nodes were expanded.
    pub fn search(
        &mut self,
        start: Coordinate4D,
        goal:  Coordinate4D,
        agent: &PathAgent,
        bid:   &Bid,
    ) -> MechanismResult<Option<PathResult>> {
        let dim = self.env.dimension();
        let speed = agent.speed.max(1);
        if start.distance_l1(goal) * speed > dim.t - start.t {
            trace!(agent = %agent.id(), %start, %goal, "goal beyond time horizon");
            return Ok(None);
        }
        let Some(start_collisions) = self.validate(start, agent, bid)? else {
            return Ok(None);
        };

        let mut nodes = vec![Node { position: start, parent: None, g: 0.0, collisions: start_collisions }];
        let mut seen: FxHashSet<Coordinate4D> = FxHashSet::default();
        seen.insert(start);
        let mut heap: BinaryHeap<Reverse<(Cost, Cost, usize)>> = BinaryHeap::new();
        let h0 = start.distance_l2(goal);
        heap.push(Reverse((Cost(self.f(0.0, h0, start)), Cost(h0), 0)));

        let mut expanded = 0;
        while let Some(Reverse((_, _, idx))) = heap.pop() {
            expanded += 1;
            if expanded > self.config.max_iter {
                trace!(agent = %agent.id(), %start, %goal, expanded, "iteration cap reached");
                return Ok(None);
            }

            let position = nodes[idx].position;
            if position.inter_temporal_eq(goal) {
                let result = self.reconstruct(&nodes, idx, speed, expanded);
                trace!(agent = %agent.id(), %start, %goal, cells = result.path.len(), expanded, "path found");
                return Ok(Some(result));
            }

            let g = nodes[idx].g + self.config.step_cost;
            for step in MOVES {
                let next = (position + step).with_t(position.t + speed);
                if !seen.insert(next) {
                    continue;
                }
                let Some(collisions) = self.validate(next, agent, bid)? else {
                    continue;
                };
                let h = next.distance_l2(goal);
                nodes.push(Node { position: next, parent: Some(idx), g, collisions });
                heap.push(Reverse((Cost(self.f(g, h, next)), Cost(h), nodes.len() - 1)));
            }
        }

        trace!(agent = %agent.id(), %start, %goal, expanded, "search space exhausted");
        Ok(None)
    }

    fn f(&self, g: f64, h: f64, at: Coordinate4D) -> f64 {
        let height = self.env.dimension().y;
        if self.config.height_adjust == 0.0 || height <= 0 {
            return g + h;
        }
        g + h - (at.y as f64 / height as f64) * self.config.height_adjust * h
    }

    fn reconstruct(&self, nodes: &[Node], goal: usize, speed: i64, expanded: usize) -> PathResult {
        let mut chain = Vec::new();
        let mut collisions: FxHashSet<AgentId> = FxHashSet::default();
        let mut cursor = Some(goal);
        while let Some(i) = cursor {
            chain.push(nodes[i].position);
            collisions.extend(nodes[i].collisions.iter().copied());
            cursor = nodes[i].parent;
        }
        chain.reverse();

        let mut path = Vec::with_capacity(chain.len() * speed as usize);
        for cell in chain {
            path.extend((0..speed).map(|k| cell.with_t(cell.t + k)));
        }
        let mut collisions: Vec<AgentId> = collisions.into_iter().collect();
        collisions.sort_unstable();
        PathResult { path, collisions, expanded }
    }
}
