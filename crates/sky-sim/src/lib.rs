//! `sky-sim` — reference driving loop for the skyslot allocator.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Spawn     — every Owner may produce new agents.
//!   ② Baseline  — optional "alone in the sky" plan per new path agent
//!                 (parallel with the `parallel` feature).
//!   ③ Allocate  — Mechanism::allocate on a speculative clone, then commit.
//!   ④ Record    — TickRecord appended to the History.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Computes baselines on Rayon's thread pool.               |
//! | `serde`    | Serialize/deserialize derives on history and config.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sky_core::{AStarConfig, Coordinate2D, SimConfig, WorldConfig};
//! use sky_env::Environment;
//! use sky_mechanism::Mechanism;
//! use sky_sim::{NoopObserver, ScheduledPathOwner, SimBuilder};
//!
//! let env = Environment::from_config(&world)?;
//! let courier = ScheduledPathOwner::new("courier", vec![Coordinate2D::new(3, 3), Coordinate2D::new(7, 7)], vec![3]);
//! let mut sim = SimBuilder::new(SimConfig::default(), env, Mechanism::priority(AStarConfig::default(), 1.0))
//!     .owner(courier)
//!     .build()?;
//! let history = sim.run(&mut NoopObserver)?;
//! ```

pub mod baseline;
pub mod builder;
pub mod error;
pub mod history;
pub mod observer;
pub mod owner;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use history::{History, TickRecord};
pub use observer::{NoopObserver, SimObserver};
pub use owner::{
    ground_stop, spread_spawn_ticks, IdSource, Owner, RandomPathOwner, ScheduledPathOwner, StationarySpaceOwner,
};
pub use sim::Sim;
