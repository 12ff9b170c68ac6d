//! Read-only obstacle index.
//!
//! Built once from the world's blocker specs and never mutated afterwards,
//! so environments share it behind an `Arc`.  Every query first collects
//! candidates from the R-tree, then runs each blocker's exact predicate.

use sky_core::{BlockerId, BlockerSpec, Coordinate4D, WorldConfig};

use crate::blocker::Blocker;
use crate::error::{SpatialError, SpatialResult};
use crate::index::{IndexEntry, Interval4, SpatialIndex};

pub struct BlockerIndex {
    /// Indexed by `BlockerId`.
    blockers:  Vec<Blocker>,
    index:     SpatialIndex<BlockerId>,
    dimension: Coordinate4D,
}

impl BlockerIndex {
    /// An index with no obstacles.
    pub fn empty(dimension: Coordinate4D) -> Self {
        Self { blockers: Vec::new(), index: SpatialIndex::new(), dimension }
    }

    pub fn from_config(config: &WorldConfig) -> SpatialResult<Self> {
        config.validate()?;
        Self::from_specs(&config.blockers, config.dimension)
    }

    /// Assign ids in order and bulk-load every blocker's intervals.
    pub fn from_specs(specs: &[BlockerSpec], dimension: Coordinate4D) -> SpatialResult<Self> {
        let mut blockers = Vec::with_capacity(specs.len());
        let mut entries = Vec::new();
        for (i, spec) in specs.iter().enumerate() {
            let id = BlockerId::try_from(i).map_err(|_| SpatialError::TooManyBlockers(i))?;
            let blocker = Blocker::from_spec(id, spec);
            let intervals = blocker.intervals(dimension);
            if intervals.is_empty() {
                return Err(SpatialError::EmptyBlocker(id));
            }
            entries.extend(intervals.into_iter().map(|interval| IndexEntry { key: id, interval }));
            blockers.push(blocker);
        }
        Ok(Self { blockers, index: SpatialIndex::bulk_load(entries), dimension })
    }

    pub fn len(&self) -> usize {
        self.blockers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blockers.is_empty()
    }

    pub fn dimension(&self) -> Coordinate4D {
        self.dimension
    }

    pub fn get(&self, id: BlockerId) -> Option<&Blocker> {
        self.blockers.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Blocker> {
        self.blockers.iter()
    }

    /// Blockers whose intervals touch `coord ± radius` over `[t, t + span]`.
    pub fn blockers_at(&self, coord: Coordinate4D, radius: i64, span: i64) -> Vec<&Blocker> {
        self.candidates(&Interval4::around(coord, radius, span))
    }

    /// Blockers whose intervals touch the closed box `[min, max]`.
    pub fn blockers_in(&self, min: Coordinate4D, max: Coordinate4D) -> Vec<&Blocker> {
        self.candidates(&Interval4::new(min, max))
    }

    /// Any blocker within `radius` of `coord` during `[t, t + speed]`.
    pub fn is_blocked(&self, coord: Coordinate4D, radius: i64, speed: i64) -> bool {
        self.blockers_at(coord, radius, speed).into_iter().any(|b| b.is_blocking(coord, radius))
    }

    /// Any static blocker within `radius` of `coord`.
    pub fn is_blocked_forever(&self, coord: Coordinate4D, radius: i64) -> bool {
        self.blockers_at(coord, radius, 0)
            .into_iter()
            .any(|b| b.is_static() && b.is_blocking(coord, radius))
    }

    pub fn is_box_blocked(&self, min: Coordinate4D, max: Coordinate4D) -> bool {
        self.blockers_in(min, max).into_iter().any(|b| b.is_box_blocking(min, max))
    }

    pub fn is_box_blocked_forever(&self, min: Coordinate4D, max: Coordinate4D) -> bool {
        self.blockers_in(min, max)
            .into_iter()
            .any(|b| b.is_static() && b.is_box_blocking(min, max))
    }

    fn candidates(&self, window: &Interval4) -> Vec<&Blocker> {
        let mut ids: Vec<BlockerId> = self.index.keys_in(window).into_iter().collect();
        ids.sort_unstable();
        ids.into_iter().filter_map(|id| self.get(id)).collect()
    }
}
