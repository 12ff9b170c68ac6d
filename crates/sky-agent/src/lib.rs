//! `sky-agent` — the agent, segment, bid and allocation data model.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`segment`]    | `PathSegment`, `SpaceSegment`, `Segment`                  |
//! | [`agent`]      | `PathAgent`, `SpaceAgent`, `Agent`                        |
//! | [`bid`]        | `Bid`, `BidDemand`, `PathBid`, `SpaceBid`                 |
//! | [`allocation`] | `Allocation`, `AllocationHistory`, `AllocationReason`     |
//! | [`builder`]    | `PathAgentBuilder`                                        |
//! | [`error`]      | `AgentError`, `AgentResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on segments, bids and allocations. |

pub mod agent;
pub mod allocation;
pub mod bid;
pub mod builder;
pub mod error;
pub mod segment;

#[cfg(test)]
mod tests;

pub use agent::{Agent, PathAgent, SpaceAgent};
pub use allocation::{Allocation, AllocationHistory, AllocationReason};
pub use bid::{Bid, BidDemand, PathBid, SpaceBid};
pub use builder::PathAgentBuilder;
pub use error::{AgentError, AgentResult};
pub use segment::{PathSegment, Segment, SpaceSegment};
