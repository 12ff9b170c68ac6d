//! `sky-mechanism` — bidding, path search, allocation and pricing.
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`bid_tracker`] | `BidTracker`: per-tick bid memo, historical max priority   |
//! | [`policy`]      | `DisplacementPolicy`: may one bid take another's airspace  |
//! | [`astar`]       | `AStar`: time-expanded search with displacement tracking   |
//! | [`allocator`]   | `Allocator` trait and the shared worklist pass             |
//! | [`priority`]    | `PriorityAllocator` (preemptive)                           |
//! | [`fcfs`]        | `FcfsAllocator` (non-preemptive, arrival order)            |
//! | [`payment`]     | `PaymentRule`, `VoxelPaymentRule`, `PriorityPaymentRule`   |
//! | [`mechanism`]   | `Mechanism`: allocator + payment rule over a two-phase commit |
//! | [`error`]       | `MechanismError`, `MechanismResult<T>`                     |

pub mod allocator;
pub mod astar;
pub mod bid_tracker;
pub mod error;
pub mod fcfs;
pub mod mechanism;
pub mod payment;
pub mod policy;
pub mod priority;

#[cfg(test)]
mod tests;

pub use allocator::Allocator;
pub use astar::{AStar, PathResult};
pub use bid_tracker::BidTracker;
pub use error::{MechanismError, MechanismResult};
pub use fcfs::FcfsAllocator;
pub use mechanism::Mechanism;
pub use payment::{PaymentRule, PriorityPaymentRule, VoxelPaymentRule};
pub use policy::DisplacementPolicy;
pub use priority::PriorityAllocator;
