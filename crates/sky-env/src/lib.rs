//! `sky-env` — the airspace environment.
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`environment`] | `Environment` (registry, allocation index, commit)    |
//! | [`collision`]   | exact radius-aware conflict predicates                |
//! | [`error`]       | `EnvError`, `EnvResult<T>`                            |

pub mod collision;
pub mod environment;
pub mod error;


pub use environment::Environment;
pub use error::{EnvError, EnvResult};
