//! Obstacle model.
//!
//! | Kind                 | Index footprint                                  | Exact test            |
//! |----------------------|--------------------------------------------------|-----------------------|
//! | static box           | `[location, location + dimension] × [0, world.t]` | always blocking       |
//! | static polygon       | polygon bounds × `[y_min, y_max]` × `[0, world.t]` | polygon vs. disc/rect |
//! | dynamic box          | one interval per constant-position run           | always blocking       |
//!
//! Box-shaped blockers fill their whole index interval, so an index hit is
//! already an exact hit.  Polygon blockers refine the hit in the ground plane.

use sky_core::{BlockerId, BlockerSpec, Coordinate3D, Coordinate4D};

use crate::index::Interval4;
use crate::polygon::Polygon;

// ── Footprint ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum Footprint {
    /// The full axis-aligned box.
    Box,
    /// A ground polygon extruded over the blocker's height band.
    Polygon(Polygon),
}

// ── StaticBlocker ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct StaticBlocker {
    pub id:        BlockerId,
    pub location:  Coordinate3D,
    pub dimension: Coordinate3D,
    pub footprint: Footprint,
}

impl StaticBlocker {
    pub fn new_box(id: BlockerId, location: Coordinate3D, dimension: Coordinate3D) -> Self {
        Self { id, location, dimension, footprint: Footprint::Box }
    }

    /// Polygon blocker; its bounding box is rounded outwards to whole cells.
    pub fn new_polygon(id: BlockerId, polygon: Polygon, y_min: i64, y_max: i64) -> Self {
        let (min, max) = polygon.bounds();
        let location = Coordinate3D::new(min[0].floor() as i64, y_min, min[1].floor() as i64);
        let far = Coordinate3D::new(max[0].ceil() as i64, y_max, max[1].ceil() as i64);
        Self { id, location, dimension: far - location, footprint: Footprint::Polygon(polygon) }
    }

    pub fn interval(&self, world: Coordinate4D) -> Interval4 {
        Interval4::new(
            Coordinate4D::from_3d(self.location, 0),
            Coordinate4D::from_3d(self.location + self.dimension, world.t),
        )
    }

    pub fn is_blocking(&self, coord: Coordinate4D, radius: i64) -> bool {
        let Footprint::Polygon(polygon) = &self.footprint else {
            return true;
        };
        let y_min = self.location.y;
        let y_max = self.location.y + self.dimension.y;
        let height_diff = if coord.y < y_min {
            y_min - coord.y
        } else if coord.y > y_max {
            coord.y - y_max
        } else {
            0
        };
        let r2 = (radius * radius - height_diff * height_diff).max(0) as f64;
        polygon.intersects_disc([coord.x as f64, coord.z as f64], r2.sqrt())
    }

    pub fn is_box_blocking(&self, min: Coordinate4D, max: Coordinate4D) -> bool {
        match &self.footprint {
            Footprint::Box => true,
            Footprint::Polygon(polygon) => {
                polygon.intersects_rect([min.x as f64, min.z as f64], [max.x as f64, max.z as f64])
            }
        }
    }
}

// ── DynamicBlocker ────────────────────────────────────────────────────────────

/// A box of fixed size whose corner follows `path`, one position per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicBlocker {
    pub id:        BlockerId,
    pub dimension: Coordinate3D,
    pub path:      Vec<Coordinate4D>,
}

impl DynamicBlocker {
    /// One interval per maximal run of inter-temporally equal positions.
    pub fn intervals(&self) -> Vec<Interval4> {
        let mut out = Vec::new();
        let mut iter = self.path.iter().copied();
        let Some(mut run_start) = iter.next() else {
            return out;
        };
        let mut run_end = run_start;
        for pos in iter {
            if pos.inter_temporal_eq(run_start) {
                run_end = pos;
                continue;
            }
            out.push(self.run_interval(run_start, run_end));
            run_start = pos;
            run_end = pos;
        }
        out.push(self.run_interval(run_start, run_end));
        out
    }

    fn run_interval(&self, start: Coordinate4D, end: Coordinate4D) -> Interval4 {
        let max = (start + self.dimension).with_t(end.t);
        Interval4::new(start, max)
    }
}

// ── Blocker ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum Blocker {
    Static(StaticBlocker),
    Dynamic(DynamicBlocker),
}

impl Blocker {
    /// Build from a configuration entry.
    pub fn from_spec(id: BlockerId, spec: &BlockerSpec) -> Self {
        match spec {
            BlockerSpec::StaticBox { location, dimension } => {
                Blocker::Static(StaticBlocker::new_box(id, *location, *dimension))
            }
            BlockerSpec::StaticPolygon { exterior, holes, y_min, y_max } => Blocker::Static(
                StaticBlocker::new_polygon(id, Polygon::new(exterior.clone(), holes.clone()), *y_min, *y_max),
            ),
            BlockerSpec::Dynamic { dimension, path } => {
                Blocker::Dynamic(DynamicBlocker { id, dimension: *dimension, path: path.clone() })
            }
        }
    }

    pub fn id(&self) -> BlockerId {
        match self {
            Blocker::Static(b) => b.id,
            Blocker::Dynamic(b) => b.id,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Blocker::Static(_))
    }

    /// Index intervals for a world of extent `world`.
    pub fn intervals(&self, world: Coordinate4D) -> Vec<Interval4> {
        match self {
            Blocker::Static(b) => vec![b.interval(world)],
            Blocker::Dynamic(b) => b.intervals(),
        }
    }

    pub fn is_blocking(&self, coord: Coordinate4D, radius: i64) -> bool {
        match self {
            Blocker::Static(b) => b.is_blocking(coord, radius),
            Blocker::Dynamic(_) => true,
        }
    }

    pub fn is_box_blocking(&self, min: Coordinate4D, max: Coordinate4D) -> bool {
        match self {
            Blocker::Static(b) => b.is_box_blocking(min, max),
            Blocker::Dynamic(_) => true,
        }
    }
}
