//! Configuration surface consumed by the allocation engine.
//!
//! Typically loaded from a TOML/JSON file by the application crate (with the
//! `serde` feature) and passed to the environment and simulation builders.
//!
//! | Type           | Consumer                                          |
//! |----------------|---------------------------------------------------|
//! | `WorldConfig`  | `Environment::from_config` (dimension, blockers)  |
//! | `BlockerSpec`  | `BlockerIndex::from_specs`                         |
//! | `AStarConfig`  | the pathfinder in `sky-mechanism`                  |
//! | `SimConfig`    | the reference driving loop in `sky-sim`            |

use crate::{Coordinate3D, Coordinate4D, SkyError, SkyResult};

// ── BlockerSpec ───────────────────────────────────────────────────────────────

/// Geometry of one obstacle, before it is assigned an id and indexed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockerSpec {
    /// Axis-aligned box present for the whole run.
    StaticBox {
        location:  Coordinate3D,
        dimension: Coordinate3D,
    },

    /// Ground polygon `(x, z)` extruded over the altitude band `[y_min, y_max]`.
    StaticPolygon {
        exterior: Vec<[f64; 2]>,
        holes:    Vec<Vec<[f64; 2]>>,
        y_min:    i64,
        y_max:    i64,
    },

    /// Box of size `dimension` whose corner follows `path`, one point per tick.
    Dynamic {
        dimension: Coordinate3D,
        path:      Vec<Coordinate4D>,
    },
}

// ── WorldConfig ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// Extent of the world: cells `0..dimension` on `x`, `y`, `z`; ticks `0..=dimension.t`.
    pub dimension: Coordinate4D,

    /// Lowest altitude spawn policies may place a stop at.
    pub min_height: i64,

    /// Hint for how many ticks apart allocation passes are expected.
    pub allocation_period: u64,

    pub blockers: Vec<BlockerSpec>,
}

impl WorldConfig {
    pub fn new(dimension: Coordinate4D) -> Self {
        Self { dimension, min_height: 0, allocation_period: 1, blockers: Vec::new() }
    }

    pub fn with_blocker(mut self, blocker: BlockerSpec) -> Self {
        self.blockers.push(blocker);
        self
    }

    pub fn with_min_height(mut self, min_height: i64) -> Self {
        self.min_height = min_height;
        self
    }

    pub fn validate(&self) -> SkyResult<()> {
        let d = self.dimension;
        if d.x <= 0 || d.y <= 0 || d.z <= 0 || d.t <= 0 {
            return Err(SkyError::InvalidDimension(d));
        }
        if self.min_height < 0 || self.min_height >= d.y {
            return Err(SkyError::InvalidMinHeight { min_height: self.min_height, height: d.y });
        }
        if self.allocation_period == 0 {
            return Err(SkyError::Config("allocation_period must be at least 1".into()));
        }
        for spec in &self.blockers {
            match spec {
                BlockerSpec::StaticBox { dimension, .. } => {
                    if dimension.x < 0 || dimension.y < 0 || dimension.z < 0 {
                        return Err(SkyError::Config(format!("negative blocker dimension {dimension}")));
                    }
                }
                BlockerSpec::StaticPolygon { exterior, y_min, y_max, .. } => {
                    if exterior.len() < 3 {
                        return Err(SkyError::Config("polygon blocker needs at least 3 vertices".into()));
                    }
                    if y_min > y_max {
                        return Err(SkyError::Config(format!("polygon band {y_min}..{y_max} is inverted")));
                    }
                }
                BlockerSpec::Dynamic { path, .. } => {
                    if path.is_empty() {
                        return Err(SkyError::Config("dynamic blocker has an empty path".into()));
                    }
                }
            }
        }
        Ok(())
    }
}

// ── AStarConfig ───────────────────────────────────────────────────────────────

/// Tuning knobs of the time-expanded pathfinder.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AStarConfig {
    /// Expansions before the search gives up.  Default: 100 000.
    pub max_iter: usize,

    /// Cost added to `g` per expansion step.  Default: 0.5.
    pub step_cost: f64,

    /// Weight of the altitude bias subtracted from `f`.  Default: 0.05.
    pub height_adjust: f64,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self { max_iter: 100_000, step_cost: 0.5, height_adjust: 0.05 }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Ticks to simulate, starting at tick 0.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { total_ticks: 100, seed: 0 }
    }
}
