//! Whether one bid may take airspace from another.

use sky_agent::Bid;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplacementPolicy {
    /// A strictly higher priority displaces the holder.
    #[default]
    Preemptive,
    /// Held airspace is never taken away.
    NonPreemptive,
}

impl DisplacementPolicy {
    #[inline]
    pub fn may_displace(self, bidder: &Bid, holder: &Bid) -> bool {
        match self {
            DisplacementPolicy::Preemptive => bidder.outranks(holder),
            DisplacementPolicy::NonPreemptive => false,
        }
    }
}
