//! Spawn policies.
//!
//! An [`Owner`] decides when agents appear and what they ask for.  Owners
//! only read the environment's geometry (`dimension`, `min_height`,
//! `is_blocked_forever`) so they never propose stops inside a static
//! obstacle.
//!
//! | Owner                   | Spawns                                                   |
//! |-------------------------|----------------------------------------------------------|
//! | `ScheduledPathOwner`    | one path agent per listed tick over fixed ground stops   |
//! | `RandomPathOwner`       | A→B trips between uniformly random ground points         |
//! | `StationarySpaceOwner`  | space agents reserving randomly placed boxes             |

use sky_agent::{Agent, PathAgent, PathAgentBuilder, SpaceAgent};
use sky_core::{AgentId, Coordinate2D, Coordinate4D, SimRng, Tick};
use sky_env::Environment;

use crate::error::{SimError, SimResult};

/// Extra ticks a random trip may take beyond its direct flight time.
const MAX_SLACK: i64 = 100;

// ── Ids ───────────────────────────────────────────────────────────────────────

/// Hands out agent ids in spawn order.
#[derive(Clone, Debug, Default)]
pub struct IdSource {
    next: u32,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> AgentId {
        let id = AgentId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}

// ── Owner trait ───────────────────────────────────────────────────────────────

/// Pluggable spawn policy.
///
/// Called once per tick for every owner, in registration order.  Each owner
/// gets its own RNG stream so adding an owner leaves the others unchanged.
pub trait Owner: Send {
    fn name(&self) -> &str;

    fn generate_agents(
        &mut self,
        tick: Tick,
        env:  &Environment,
        ids:  &mut IdSource,
        rng:  &mut SimRng,
    ) -> SimResult<Vec<Agent>>;
}

/// `(x, min_height, z, t)`, raised until a static blocker no longer covers
/// it.  Wraps to `min_height` at the ceiling and gives up after one round.
pub fn ground_stop(env: &Environment, at: Coordinate2D, t: i64, near_radius: i64) -> Coordinate4D {
    let min_height = env.min_height();
    let ceiling = env.dimension().y;
    let mut coord = Coordinate4D::from_3d(at.at_height(min_height), t);
    while env.is_blocked_forever(coord, near_radius) {
        coord.y += 1;
        if coord.y >= ceiling {
            coord.y = min_height;
        }
        if coord.y == min_height {
            break;
        }
    }
    coord
}

/// Whole ticks needed to fly straight from `a` to `b`.
fn travel_time(a: Coordinate4D, b: Coordinate4D, speed: i64) -> i64 {
    a.distance_l2(b).ceil() as i64 * speed
}

fn random_point(env: &Environment, rng: &mut SimRng) -> Coordinate2D {
    let d = env.dimension();
    Coordinate2D::new(rng.gen_range(0..d.x.max(1)), rng.gen_range(0..d.z.max(1)))
}

/// `count` spawn ticks drawn uniformly from the environment's allocation
/// period `0..allocation_period`, in ascending order.
///
/// Feed the result to an owner's `spawn_ticks` to spread arrivals over the
/// period instead of listing them by hand.
pub fn spread_spawn_ticks(env: &Environment, count: usize, rng: &mut SimRng) -> Vec<u64> {
    let period = env.allocation_period().max(1);
    let mut ticks: Vec<u64> = (0..count).map(|_| rng.gen_range(0..period)).collect();
    ticks.sort_unstable();
    ticks
}

// ── ScheduledPathOwner ────────────────────────────────────────────────────────

/// Flies the same ground stops once for each listed spawn tick.
#[derive(Clone, Debug)]
pub struct ScheduledPathOwner {
    name:        String,
    stops:       Vec<Coordinate2D>,
    spawn_ticks: Vec<u64>,
    stays:       Vec<i64>,
    priority:    f64,
    speed:       i64,
    near_radius: i64,
    /// `None` means twice the direct flight time.
    battery:     Option<i64>,
}

impl ScheduledPathOwner {
    pub fn new(name: impl Into<String>, stops: Vec<Coordinate2D>, spawn_ticks: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            stops,
            spawn_ticks,
            stays: Vec::new(),
            priority: 0.0,
            speed: PathAgent::DEFAULT_SPEED,
            near_radius: PathAgent::DEFAULT_NEAR_RADIUS,
            battery: None,
        }
    }

    pub fn priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn speed(mut self, speed: i64) -> Self {
        self.speed = speed;
        self
    }

    pub fn near_radius(mut self, near_radius: i64) -> Self {
        self.near_radius = near_radius;
        self
    }

    pub fn battery(mut self, battery: i64) -> Self {
        self.battery = Some(battery);
        self
    }

    pub fn stays(mut self, stays: Vec<i64>) -> Self {
        self.stays = stays;
        self
    }

    fn spawn(&self, tick: Tick, env: &Environment, id: AgentId) -> SimResult<PathAgent> {
        let mut stops: Vec<Coordinate4D> = Vec::with_capacity(self.stops.len());
        let mut flight = 0;
        for (i, &at) in self.stops.iter().enumerate() {
            let coord = match stops.last() {
                None => ground_stop(env, at, tick.t(), self.near_radius),
                Some(&prev) => {
                    let mut next = ground_stop(env, at, prev.t, self.near_radius);
                    let hop = travel_time(prev, next, self.speed);
                    flight += hop;
                    let dwell = if i >= 2 { self.stays.get(i - 2).copied().unwrap_or(0) } else { 0 };
                    next.t = (prev.t + dwell + hop).min(env.dimension().t);
                    next
                }
            };
            stops.push(coord);
        }

        PathAgentBuilder::new(id)
            .stops(stops)
            .stays(self.stays.clone())
            .speed(self.speed)
            .near_radius(self.near_radius)
            .battery(self.battery.unwrap_or(flight * 2))
            .priority(self.priority)
            .build()
            .map_err(|source| SimError::Owner { owner: self.name.clone(), source })
    }
}

impl Owner for ScheduledPathOwner {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_agents(
        &mut self,
        tick: Tick,
        env:  &Environment,
        ids:  &mut IdSource,
        _rng: &mut SimRng,
    ) -> SimResult<Vec<Agent>> {
        let due = self.spawn_ticks.iter().filter(|&&t| t == tick.0).count();
        (0..due).map(|_| self.spawn(tick, env, ids.next_id()).map(Agent::Path)).collect()
    }
}

// ── RandomPathOwner ───────────────────────────────────────────────────────────

/// A→B trips between random ground points, with a random delivery window.
#[derive(Clone, Debug)]
pub struct RandomPathOwner {
    name:        String,
    spawn_ticks: Vec<u64>,
    priority:    f64,
    speed:       i64,
    near_radius: i64,
}

impl RandomPathOwner {
    pub fn new(name: impl Into<String>, spawn_ticks: Vec<u64>, priority: f64) -> Self {
        Self {
            name: name.into(),
            spawn_ticks,
            priority,
            speed: PathAgent::DEFAULT_SPEED,
            near_radius: PathAgent::DEFAULT_NEAR_RADIUS,
        }
    }

    pub fn speed(mut self, speed: i64) -> Self {
        self.speed = speed;
        self
    }

    pub fn near_radius(mut self, near_radius: i64) -> Self {
        self.near_radius = near_radius;
        self
    }
}

impl Owner for RandomPathOwner {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_agents(
        &mut self,
        tick: Tick,
        env:  &Environment,
        ids:  &mut IdSource,
        rng:  &mut SimRng,
    ) -> SimResult<Vec<Agent>> {
        let due = self.spawn_ticks.iter().filter(|&&t| t == tick.0).count();
        let mut out = Vec::with_capacity(due);
        for _ in 0..due {
            let start = ground_stop(env, random_point(env, rng), tick.t(), self.near_radius);
            let mut target = ground_stop(env, random_point(env, rng), tick.t(), self.near_radius);
            let flight = travel_time(start, target, self.speed);
            target.t = (start.t + flight + rng.gen_range(0..=MAX_SLACK)).min(env.dimension().t);

            let agent = PathAgentBuilder::new(ids.next_id())
                .stops([start, target])
                .speed(self.speed)
                .near_radius(self.near_radius)
                .battery(flight * 2)
                .priority(self.priority)
                .build()
                .map_err(|source| SimError::Owner { owner: self.name.clone(), source })?;
            out.push(Agent::Path(agent));
        }
        Ok(out)
    }
}

// ── StationarySpaceOwner ──────────────────────────────────────────────────────

/// Reserves `boxes` randomly placed boxes of `size` per spawned agent.
#[derive(Clone, Debug)]
pub struct StationarySpaceOwner {
    name:        String,
    spawn_ticks: Vec<u64>,
    size:        Coordinate4D,
    boxes:       usize,
    priority:    f64,
}

impl StationarySpaceOwner {
    pub fn new(name: impl Into<String>, spawn_ticks: Vec<u64>, size: Coordinate4D, priority: f64) -> Self {
        Self { name: name.into(), spawn_ticks, size, boxes: 1, priority }
    }

    pub fn boxes(mut self, boxes: usize) -> Self {
        self.boxes = boxes.max(1);
        self
    }
}

impl Owner for StationarySpaceOwner {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_agents(
        &mut self,
        tick: Tick,
        env:  &Environment,
        ids:  &mut IdSource,
        rng:  &mut SimRng,
    ) -> SimResult<Vec<Agent>> {
        let d = env.dimension();
        let due = self.spawn_ticks.iter().filter(|&&t| t == tick.0).count();
        let mut out = Vec::with_capacity(due);
        for _ in 0..due {
            let blocks = (0..self.boxes)
                .map(|_| {
                    let at = random_point(env, rng);
                    let min = Coordinate4D::new(at.x, env.min_height(), at.z, tick.t());
                    let max = Coordinate4D::new(
                        (min.x + self.size.x).min(d.x - 1),
                        (min.y + self.size.y).min(d.y - 1),
                        (min.z + self.size.z).min(d.z - 1),
                        (min.t + self.size.t).min(d.t),
                    );
                    (min, max)
                })
                .collect();
            out.push(Agent::Space(SpaceAgent::new(ids.next_id(), blocks, self.priority)));
        }
        Ok(out)
    }
}
