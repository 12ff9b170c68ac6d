//! Payment rules: committed allocations in, per-agent charges out.
//!
//! | Rule                  | Charge                                               |
//! |-----------------------|------------------------------------------------------|
//! | `VoxelPaymentRule`    | `voxels × price_per_voxel`                           |
//! | `PriorityPaymentRule` | `voxels × price_per_voxel × max priority ever bid`   |
//!
//! Failed allocations hold no voxels and pay nothing.

use rustc_hash::FxHashMap;

use sky_agent::Allocation;
use sky_core::AgentId;

use crate::bid_tracker::BidTracker;

pub trait PaymentRule: Send {
    fn payments(&self, allocations: &[Allocation], tracker: &BidTracker) -> FxHashMap<AgentId, f64>;
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelPaymentRule {
    pub price_per_voxel: f64,
}

impl VoxelPaymentRule {
    pub fn new(price_per_voxel: f64) -> Self {
        Self { price_per_voxel }
    }
}

impl PaymentRule for VoxelPaymentRule {
    fn payments(&self, allocations: &[Allocation], _tracker: &BidTracker) -> FxHashMap<AgentId, f64> {
        allocations
            .iter()
            .map(|a| (a.agent_id(), a.voxels() as f64 * self.price_per_voxel))
            .collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityPaymentRule {
    pub price_per_voxel: f64,
}

impl PriorityPaymentRule {
    pub fn new(price_per_voxel: f64) -> Self {
        Self { price_per_voxel }
    }
}

impl PaymentRule for PriorityPaymentRule {
    fn payments(&self, allocations: &[Allocation], tracker: &BidTracker) -> FxHashMap<AgentId, f64> {
        allocations
            .iter()
            .map(|a| {
                let id = a.agent_id();
                let priority = tracker.max_priority(id).unwrap_or(0.0);
                (id, a.voxels() as f64 * self.price_per_voxel * priority)
            })
            .collect()
    }
}
