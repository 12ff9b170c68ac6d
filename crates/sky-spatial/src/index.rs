//! 4-D interval index.
//!
//! # Data layout
//!
//! Every claim on spacetime (a blocker's lifetime box, a run of identical
//! cells of a path segment, a space segment) is stored as one closed
//! [`Interval4`] tagged with its owner key `K`.  The index is an `rstar`
//! R-tree over `AABB<[i64; 4]>` envelopes in `[x, y, z, t]` order, so a
//! range query costs O(log n + k).
//!
//! An owner may hold many entries.  Removal is by exact entry, and
//! [`SpatialIndex::truncate_from`] cuts every entry of one owner at a tick,
//! keeping the elapsed part.  A per-owner list shadows the tree so that
//! truncation only visits that owner's entries.

use rstar::{Envelope, RTree, RTreeObject, SelectionFunction, AABB};
use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;

use sky_core::Coordinate4D;

// ── Interval4 ─────────────────────────────────────────────────────────────────

/// Closed axis-aligned box in `(x, y, z, t)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval4 {
    pub min: Coordinate4D,
    pub max: Coordinate4D,
}

impl Interval4 {
    #[inline]
    pub fn new(min: Coordinate4D, max: Coordinate4D) -> Self {
        Self { min, max }
    }

    /// The cube `coord ± radius` spanning ticks `[coord.t, coord.t + span]`.
    pub fn around(coord: Coordinate4D, radius: i64, span: i64) -> Self {
        Self {
            min: Coordinate4D::new(coord.x - radius, coord.y - radius, coord.z - radius, coord.t),
            max: Coordinate4D::new(coord.x + radius, coord.y + radius, coord.z + radius, coord.t + span),
        }
    }

    /// All space over ticks `[from, ∞)`.
    pub fn from_tick(from: i64) -> Self {
        Self {
            min: Coordinate4D::new(i64::MIN, i64::MIN, i64::MIN, from),
            max: Coordinate4D::new(i64::MAX, i64::MAX, i64::MAX, i64::MAX),
        }
    }

    #[inline]
    pub fn intersects(&self, other: &Interval4) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
            && self.min.t <= other.max.t
            && other.min.t <= self.max.t
    }

    #[inline]
    pub fn envelope(&self) -> AABB<[i64; 4]> {
        AABB::from_corners(self.min.to_array(), self.max.to_array())
    }
}

// ── IndexEntry ────────────────────────────────────────────────────────────────

/// One interval owned by `key`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct IndexEntry<K> {
    pub key:      K,
    pub interval: Interval4,
}

impl<K> RTreeObject for IndexEntry<K> {
    type Envelope = AABB<[i64; 4]>;
    fn envelope(&self) -> Self::Envelope {
        self.interval.envelope()
    }
}

/// Selects every entry whose envelope intersects a query box.
struct Intersecting(AABB<[i64; 4]>);

impl<K> SelectionFunction<IndexEntry<K>> for Intersecting {
    fn should_unpack_parent(&self, envelope: &AABB<[i64; 4]>) -> bool {
        self.0.intersects(envelope)
    }

    fn should_unpack_leaf(&self, leaf: &IndexEntry<K>) -> bool {
        self.0.intersects(&leaf.envelope())
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Multi-entry interval index keyed by owner.
///
/// Next to the tree, every owner's intervals are listed in `owned` so that
/// per-owner work ([`entries_of`](Self::entries_of),
/// [`truncate_from`](Self::truncate_from)) never walks other owners' entries.
///
/// Cloning deep-copies both.
#[derive(Clone)]
pub struct SpatialIndex<K> {
    tree:  RTree<IndexEntry<K>>,
    owned: FxHashMap<K, Vec<Interval4>>,
}

impl<K> Default for SpatialIndex<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SpatialIndex<K>
where
    K: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self { tree: RTree::new(), owned: FxHashMap::default() }
    }

    /// Bulk-load for O(N log N) construction (faster than N inserts).
    pub fn bulk_load(entries: Vec<IndexEntry<K>>) -> Self {
        let mut owned: FxHashMap<K, Vec<Interval4>> = FxHashMap::default();
        for entry in &entries {
            owned.entry(entry.key).or_default().push(entry.interval);
        }
        Self { tree: RTree::bulk_load(entries), owned }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn insert(&mut self, key: K, interval: Interval4) {
        self.tree.insert(IndexEntry { key, interval });
        self.owned.entry(key).or_default().push(interval);
    }

    /// Remove one exact entry.  Returns `false` if it was not present.
    pub fn remove(&mut self, entry: &IndexEntry<K>) -> bool {
        if self.tree.remove(entry).is_none() {
            return false;
        }
        if let Some(list) = self.owned.get_mut(&entry.key) {
            if let Some(i) = list.iter().position(|iv| *iv == entry.interval) {
                list.swap_remove(i);
            }
            if list.is_empty() {
                self.owned.remove(&entry.key);
            }
        }
        true
    }

    /// Entries intersecting `window`.
    pub fn query<'a>(&'a self, window: &Interval4) -> impl Iterator<Item = &'a IndexEntry<K>> + 'a {
        self.tree.locate_with_selection_function(Intersecting(window.envelope()))
    }

    /// Distinct owners with at least one entry intersecting `window`.
    pub fn keys_in(&self, window: &Interval4) -> FxHashSet<K> {
        self.query(window).map(|e| e.key).collect()
    }

    /// All entries of `key`, in no particular order.
    pub fn entries_of(&self, key: K) -> Vec<IndexEntry<K>> {
        self.owned
            .get(&key)
            .map(|list| list.iter().map(|&interval| IndexEntry { key, interval }).collect())
            .unwrap_or_default()
    }

    /// Drop every part of `key`'s entries at or after tick `t`.
    ///
    /// Entries that straddle `t` are re-inserted with `max.t = t - 1`.
    /// Returns the number of entries touched.  Cost depends only on how many
    /// entries `key` owns.
    pub fn truncate_from(&mut self, key: K, t: i64) -> usize {
        let Some(list) = self.owned.get_mut(&key) else {
            return 0;
        };

        let mut touched = 0;
        let mut kept = Vec::with_capacity(list.len());
        for &interval in list.iter() {
            if interval.max.t < t {
                kept.push(interval);
                continue;
            }
            touched += 1;
            self.tree.remove(&IndexEntry { key, interval });
            if interval.min.t < t {
                let mut head = interval;
                head.max.t = t - 1;
                self.tree.insert(IndexEntry { key, interval: head });
                kept.push(head);
            }
        }

        if kept.is_empty() {
            self.owned.remove(&key);
        } else {
            *list = kept;
        }
        touched
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry<K>> {
        self.tree.iter()
    }
}
