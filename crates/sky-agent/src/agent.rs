//! Path and space agents.
//!
//! An agent owns its identity, its demand (itinerary or boxes), its priority
//! and the segments granted to it.  Granted segments are mutated only through
//! the environment's allocate/deallocate operations, which keep the spatial
//! index in step.
//!
//! Agents are a closed set, so [`Agent`] is an enum and every dispatch point
//! matches on it.

use sky_core::{AgentId, AgentIdentity, Coordinate4D, Tick};

use crate::bid::{Bid, BidDemand, PathBid, SpaceBid};
use crate::error::{AgentError, AgentResult};
use crate::segment::{PathSegment, Segment, SpaceSegment};

/// Ticks of lateness that cost one percent of a path agent's value.
const LATENESS_SCALE: f64 = 100.0;

// ── PathAgent ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathAgent {
    pub identity:           AgentIdentity,
    /// Ordered stops; `locations[0]` is the departure, `t` the desired time.
    pub locations:          Vec<Coordinate4D>,
    /// Dwell after arriving at `locations[i + 1]`.
    pub stays:              Vec<i64>,
    /// Ticks per cell moved; 1 is fastest.
    pub speed:              i64,
    /// Maximum flight ticks.
    pub battery:            i64,
    pub near_radius:        i64,
    pub priority:           f64,
    pub allocated_segments: Vec<PathSegment>,
}

impl PathAgent {
    pub const DEFAULT_SPEED: i64 = 1;
    pub const DEFAULT_BATTERY: i64 = 100_000;
    pub const DEFAULT_NEAR_RADIUS: i64 = 1;

    pub fn id(&self) -> AgentId {
        self.identity.origin
    }

    pub fn legs(&self) -> usize {
        self.locations.len().saturating_sub(1)
    }

    /// Total ticks spent in the air across all granted segments.
    pub fn airtime(&self) -> i64 {
        self.allocated_segments.iter().map(|s| s.max().t - s.min().t).sum()
    }

    /// Flight ticks elapsed strictly before `t`.
    pub fn flown_before(&self, t: i64) -> i64 {
        self.allocated_segments
            .iter()
            .filter(|s| s.min().t < t)
            .map(|s| s.max().t.min(t) - s.min().t)
            .sum()
    }

    pub fn allocated_coords(&self) -> Vec<Coordinate4D> {
        self.allocated_segments.iter().flat_map(|s| s.coordinates.iter().copied()).collect()
    }

    /// Join onto the last segment when it is the same leg, else append.
    pub fn add_allocated_segment(&mut self, segment: PathSegment) {
        match self.allocated_segments.last_mut() {
            Some(last) if last.same(&segment) => last.join(segment),
            _ => self.allocated_segments.push(segment),
        }
    }

    pub fn position_at(&self, t: i64) -> Option<Coordinate4D> {
        self.allocated_segments.iter().find_map(|s| s.position_at(t))
    }

    /// Granted cells with `t ∈ [from, to]`.
    pub fn positions_between(&self, from: i64, to: i64) -> impl Iterator<Item = Coordinate4D> + '_ {
        self.allocated_segments
            .iter()
            .filter(move |s| s.max().t >= from && s.min().t <= to)
            .flat_map(move |s| s.positions_between(from, to))
    }

    /// Remaining demand at `tick`, or `None` once the itinerary is done.
    ///
    /// | State at `tick`                          | Bid starts at                         |
    /// |------------------------------------------|---------------------------------------|
    /// | nothing granted before `tick`            | `locations[0]`, full itinerary        |
    /// | a segment covers `tick`                  | that cell (flying)                    |
    /// | last past segment stopped short of its leg end | its last cell at `tick` (flying) |
    /// | on the ground after leg `i`              | end of leg `i` after its dwell        |
    pub fn bid(&self, tick: Tick) -> Option<Bid> {
        let t = tick.t();
        let legs = self.legs();
        if legs == 0 {
            return None;
        }
        let battery = self.battery - self.flown_before(t);

        if let Some(seg) = self.allocated_segments.iter().find(|s| s.min().t <= t && t <= s.max().t) {
            let start = seg.position_at(t)?;
            return Some(self.bid_from(start, seg.index, battery, true));
        }

        let Some(prev) = self.allocated_segments.iter().filter(|s| s.max().t < t).last() else {
            return Some(self.bid_from(self.locations[0], 0, battery, false));
        };

        let last = prev.max();
        if last.to_3d() != prev.end {
            return Some(self.bid_from(last.with_t(t), prev.index, battery, true));
        }
        let leg = prev.index + 1;
        if leg >= legs {
            return None;
        }
        let stay = self.stays.get(prev.index).copied().unwrap_or(0);
        Some(self.bid_from(last.with_t(last.t + 1 + stay), leg, battery, false))
    }

    fn bid_from(&self, start: Coordinate4D, leg: usize, battery: i64, flying: bool) -> Bid {
        Bid {
            agent:    self.id(),
            priority: self.priority,
            demand:   BidDemand::Path(PathBid {
                start,
                targets: self.locations[leg + 1..].to_vec(),
                stays: self.stays.get(leg..).map(<[i64]>::to_vec).unwrap_or_default(),
                battery,
                flying,
                start_leg: leg,
            }),
        }
    }

    /// 1.0 minus one percent per tick of late arrival, or −1 for a crash.
    ///
    /// A crash is a missing leg, a leg ending away from its stop, or more
    /// flight time than the battery holds.
    pub fn value_for_segments(&self, segments: &[PathSegment]) -> f64 {
        if segments.is_empty() {
            return 0.0;
        }
        if segments.len() != self.legs() {
            return -1.0;
        }
        let mut value = 1.0;
        let mut time = 0;
        for (segment, stop) in segments.iter().zip(&self.locations[1..]) {
            let arrival = segment.max();
            if !arrival.inter_temporal_eq(*stop) {
                return -1.0;
            }
            time += arrival.t - segment.min().t;
            value -= (arrival.t - stop.t).max(0) as f64 / LATENESS_SCALE;
        }
        if time > self.battery {
            return -1.0;
        }
        (value.max(0.0) * 100.0).round() / 100.0
    }
}

// ── SpaceAgent ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpaceAgent {
    pub identity:           AgentIdentity,
    /// Requested boxes.
    pub blocks:             Vec<SpaceSegment>,
    pub priority:           f64,
    pub allocated_segments: Vec<SpaceSegment>,
}

impl SpaceAgent {
    pub fn new(id: AgentId, blocks: Vec<(Coordinate4D, Coordinate4D)>, priority: f64) -> Self {
        let blocks = blocks
            .into_iter()
            .enumerate()
            .map(|(i, (min, max))| SpaceSegment::new(min, max, i))
            .collect();
        Self { identity: AgentIdentity::live(id), blocks, priority, allocated_segments: Vec::new() }
    }

    pub fn id(&self) -> AgentId {
        self.identity.origin
    }

    pub fn add_allocated_segment(&mut self, segment: SpaceSegment) {
        self.allocated_segments.push(segment);
    }

    /// Granted boxes overlapping ticks `[from, to]`.
    pub fn boxes_between(&self, from: i64, to: i64) -> impl Iterator<Item = &SpaceSegment> + '_ {
        self.allocated_segments.iter().filter(move |s| s.max.t >= from && s.min.t <= to)
    }

    /// Requested boxes that still reach `tick` or later.
    pub fn bid(&self, tick: Tick) -> Option<Bid> {
        let t = tick.t();
        let blocks: Vec<SpaceSegment> = self.blocks.iter().filter(|b| b.max.t >= t).copied().collect();
        if blocks.is_empty() {
            return None;
        }
        Some(Bid { agent: self.id(), priority: self.priority, demand: BidDemand::Space(SpaceBid { blocks }) })
    }

    /// Granted voxels over requested voxels.
    pub fn value_for_segments(&self, segments: &[SpaceSegment]) -> f64 {
        let requested: u64 = self.blocks.iter().map(SpaceSegment::voxels).sum();
        if requested == 0 {
            return 0.0;
        }
        let granted: u64 = segments.iter().map(SpaceSegment::voxels).sum();
        granted as f64 / requested as f64
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Agent {
    Path(PathAgent),
    Space(SpaceAgent),
}

impl Agent {
    pub fn id(&self) -> AgentId {
        self.identity().origin
    }

    pub fn identity(&self) -> AgentIdentity {
        match self {
            Agent::Path(a) => a.identity,
            Agent::Space(a) => a.identity,
        }
    }

    pub fn priority(&self) -> f64 {
        match self {
            Agent::Path(a) => a.priority,
            Agent::Space(a) => a.priority,
        }
    }

    /// Separation this agent enforces; space agents claim their boxes exactly.
    pub fn near_radius(&self) -> i64 {
        match self {
            Agent::Path(a) => a.near_radius,
            Agent::Space(_) => 0,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Agent::Path(_) => "path",
            Agent::Space(_) => "space",
        }
    }

    pub fn is_clone(&self) -> bool {
        self.identity().is_clone
    }

    /// A deep copy marked as a speculative clone.
    pub fn speculative_clone(&self) -> Agent {
        let mut copy = self.clone();
        match &mut copy {
            Agent::Path(a) => a.identity = a.identity.cloned(),
            Agent::Space(a) => a.identity = a.identity.cloned(),
        }
        copy
    }

    pub fn bid(&self, tick: Tick) -> Option<Bid> {
        match self {
            Agent::Path(a) => a.bid(tick),
            Agent::Space(a) => a.bid(tick),
        }
    }

    pub fn allocated_segments(&self) -> Vec<Segment> {
        match self {
            Agent::Path(a) => a.allocated_segments.iter().cloned().map(Segment::Path).collect(),
            Agent::Space(a) => a.allocated_segments.iter().copied().map(Segment::Space).collect(),
        }
    }

    pub fn allocated_voxels(&self) -> u64 {
        match self {
            Agent::Path(a) => a.allocated_segments.iter().map(PathSegment::voxels).sum(),
            Agent::Space(a) => a.allocated_segments.iter().map(SpaceSegment::voxels).sum(),
        }
    }

    pub fn add_allocated_segment(&mut self, segment: Segment) -> AgentResult<()> {
        match (self, segment) {
            (Agent::Path(a), Segment::Path(s)) => a.add_allocated_segment(s),
            (Agent::Space(a), Segment::Space(s)) => a.add_allocated_segment(s),
            (agent, segment) => return Err(AgentError::kind_mismatch(agent, &segment)),
        }
        Ok(())
    }

    pub fn value_for_segments(&self, segments: &[Segment]) -> AgentResult<f64> {
        match self {
            Agent::Path(a) => {
                let mut path = Vec::with_capacity(segments.len());
                for s in segments {
                    match s {
                        Segment::Path(p) => path.push(p.clone()),
                        other => return Err(AgentError::kind_mismatch(self, other)),
                    }
                }
                Ok(a.value_for_segments(&path))
            }
            Agent::Space(a) => {
                let mut space = Vec::with_capacity(segments.len());
                for s in segments {
                    match s {
                        Segment::Space(b) => space.push(*b),
                        other => return Err(AgentError::kind_mismatch(self, other)),
                    }
                }
                Ok(a.value_for_segments(&space))
            }
        }
    }

    /// Value of what the agent currently holds.
    pub fn allocated_value(&self) -> f64 {
        match self {
            Agent::Path(a) => a.value_for_segments(&a.allocated_segments),
            Agent::Space(a) => a.value_for_segments(&a.allocated_segments),
        }
    }

    pub fn as_path(&self) -> Option<&PathAgent> {
        match self {
            Agent::Path(a) => Some(a),
            Agent::Space(_) => None,
        }
    }

    pub fn as_space(&self) -> Option<&SpaceAgent> {
        match self {
            Agent::Space(a) => Some(a),
            Agent::Path(_) => None,
        }
    }
}

impl From<PathAgent> for Agent {
    fn from(a: PathAgent) -> Self {
        Agent::Path(a)
    }
}

impl From<SpaceAgent> for Agent {
    fn from(a: SpaceAgent) -> Self {
        Agent::Space(a)
    }
}
