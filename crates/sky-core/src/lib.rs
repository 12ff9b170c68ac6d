//! `sky-core` — foundational types for the airspace allocation engine.
//!
//! This crate is a dependency of every other `sky-*` crate.  It has no
//! `sky-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `BlockerId`, `AgentIdentity`                   |
//! | [`coord`]  | `Coordinate2D`, `Coordinate3D`, `Coordinate4D`            |
//! | [`time`]   | `Tick`                                                    |
//! | [`config`] | `WorldConfig`, `BlockerSpec`, `AStarConfig`, `SimConfig`  |
//! | [`rng`]    | `SimRng`                                                  |
//! | [`error`]  | `SkyError`, `SkyResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod config;
pub mod coord;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AStarConfig, BlockerSpec, SimConfig, WorldConfig};
pub use coord::{Coordinate2D, Coordinate3D, Coordinate4D};
pub use error::{SkyError, SkyResult};
pub use ids::{AgentId, AgentIdentity, BlockerId};
pub use rng::SimRng;
pub use time::Tick;
