//! `sky-spatial` — 4-D interval indexing and the obstacle model.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                 |
//! |-------------------|----------------------------------------------------------|
//! | [`index`]         | `Interval4`, `IndexEntry`, `SpatialIndex<K>` (R-tree)    |
//! | [`polygon`]       | `Polygon` ground-plane predicates                        |
//! | [`blocker`]       | `Blocker`, `StaticBlocker`, `DynamicBlocker`, `Footprint` |
//! | [`blocker_index`] | `BlockerIndex` (read-only, shared between environments)  |
//! | [`error`]         | `SpatialError`, `SpatialResult<T>`                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod blocker;
pub mod blocker_index;
pub mod error;
pub mod index;
pub mod polygon;


pub use blocker::{Blocker, DynamicBlocker, Footprint, StaticBlocker};
pub use blocker_index::BlockerIndex;
pub use error::{SpatialError, SpatialResult};
pub use index::{IndexEntry, Interval4, SpatialIndex};
pub use polygon::Polygon;
