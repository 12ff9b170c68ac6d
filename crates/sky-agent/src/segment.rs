//! Claimed spacetime regions.
//!
//! | Type           | Shape                                          | Voxels                  |
//! |----------------|------------------------------------------------|-------------------------|
//! | `PathSegment`  | one 4-D cell per tick, contiguous in time       | coordinate count        |
//! | `SpaceSegment` | closed axis-aligned 4-D box                     | `Π (max_i − min_i + 1)` |
//!
//! A path segment covers one leg of an itinerary: `index` is the leg number
//! and `start`/`end` the leg's ground-truth endpoints.  Two segments of the
//! same leg with the same end are joined when the second is granted, which
//! happens whenever a mid-flight agent is re-planned.
//!
//! Segments are never empty while allocated; the accessors below index the
//! first/last coordinate directly.

use sky_core::{Coordinate3D, Coordinate4D};

// ── PathSegment ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathSegment {
    pub start:       Coordinate3D,
    pub end:         Coordinate3D,
    pub index:       usize,
    pub coordinates: Vec<Coordinate4D>,
}

impl PathSegment {
    pub fn new(start: Coordinate3D, end: Coordinate3D, index: usize, coordinates: Vec<Coordinate4D>) -> Self {
        Self { start, end, index, coordinates }
    }

    /// First cell.
    ///
    /// # Panics
    /// Panics if the segment is empty.
    #[inline]
    pub fn min(&self) -> Coordinate4D {
        self.coordinates[0]
    }

    /// Last cell.
    ///
    /// # Panics
    /// Panics if the segment is empty.
    #[inline]
    pub fn max(&self) -> Coordinate4D {
        self.coordinates[self.coordinates.len() - 1]
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn voxels(&self) -> u64 {
        self.coordinates.len() as u64
    }

    /// Same leg, same destination.
    pub fn same(&self, other: &PathSegment) -> bool {
        self.index == other.index && self.end == other.end
    }

    /// Append `other`, skipping its first cell if it repeats our last one.
    pub fn join(&mut self, other: PathSegment) {
        let mut rest = other.coordinates.into_iter().peekable();
        if let (Some(last), Some(first)) = (self.coordinates.last(), rest.peek()) {
            if last == first {
                rest.next();
            }
        }
        self.coordinates.extend(rest);
    }

    /// Cell occupied at tick `t`, if the segment covers it.
    pub fn position_at(&self, t: i64) -> Option<Coordinate4D> {
        let first = self.coordinates.first()?;
        let offset = usize::try_from(t - first.t).ok()?;
        self.coordinates.get(offset).copied().filter(|c| c.t == t)
    }

    /// Cells with `t ∈ [from, to]`.
    pub fn positions_between(&self, from: i64, to: i64) -> impl Iterator<Item = Coordinate4D> + '_ {
        self.coordinates.iter().copied().filter(move |c| c.t >= from && c.t <= to)
    }

    /// `(cells with time <= t, cells with time > t)`.
    pub fn split_temporal(&self, t: i64) -> (PathSegment, PathSegment) {
        let cut = self.coordinates.partition_point(|c| c.t <= t);
        let first = PathSegment::new(self.start, self.end, self.index, self.coordinates[..cut].to_vec());
        let second = PathSegment::new(self.start, self.end, self.index, self.coordinates[cut..].to_vec());
        (first, second)
    }
}

// ── SpaceSegment ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpaceSegment {
    pub min:   Coordinate4D,
    pub max:   Coordinate4D,
    pub index: usize,
}

impl SpaceSegment {
    pub fn new(min: Coordinate4D, max: Coordinate4D, index: usize) -> Self {
        Self { min, max, index }
    }

    pub fn voxels(&self) -> u64 {
        let d = self.max - self.min;
        if d.x < 0 || d.y < 0 || d.z < 0 || d.t < 0 {
            return 0;
        }
        ((d.x + 1) * (d.y + 1) * (d.z + 1) * (d.t + 1)) as u64
    }

    /// `([min.t, t], [t + 1, max.t])`.
    pub fn split_temporal(&self, t: i64) -> (SpaceSegment, SpaceSegment) {
        let mut first = *self;
        first.max.t = t;
        let mut second = *self;
        second.min.t = t + 1;
        (first, second)
    }

    pub fn covers_t(&self, t: i64) -> bool {
        self.min.t <= t && t <= self.max.t
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    Path(PathSegment),
    Space(SpaceSegment),
}

impl Segment {
    pub fn min(&self) -> Coordinate4D {
        match self {
            Segment::Path(s) => s.min(),
            Segment::Space(s) => s.min,
        }
    }

    pub fn max(&self) -> Coordinate4D {
        match self {
            Segment::Path(s) => s.max(),
            Segment::Space(s) => s.max,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Segment::Path(s) => s.index,
            Segment::Space(s) => s.index,
        }
    }

    pub fn voxels(&self) -> u64 {
        match self {
            Segment::Path(s) => s.voxels(),
            Segment::Space(s) => s.voxels(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Path(_) => "path",
            Segment::Space(_) => "space",
        }
    }
}

impl From<PathSegment> for Segment {
    fn from(s: PathSegment) -> Self {
        Segment::Path(s)
    }
}

impl From<SpaceSegment> for Segment {
    fn from(s: SpaceSegment) -> Self {
        Segment::Space(s)
    }
}
