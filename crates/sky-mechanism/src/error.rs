//! Mechanism error type.
//!
//! Expected failures (no path, battery, occupied box) are not errors; they
//! come back as `AllocationReason::AllocationFailed` records.  Everything
//! here is an invariant violation that aborts the pass.

use thiserror::Error;

use sky_core::{AgentId, Coordinate4D, Tick};
use sky_env::EnvError;

#[derive(Debug, Error)]
pub enum MechanismError {
    #[error("validating {position} at {tick}: position lies in the past")]
    PastTick { position: Coordinate4D, tick: Tick },

    #[error("{0} holds airspace but cannot bid")]
    StuckAgent(AgentId),

    #[error("{0} is not registered in the environment")]
    UnknownAgent(AgentId),

    #[error("{agent} produced a {bid_kind} bid but is a {agent_kind} agent")]
    BidMismatch {
        agent:      AgentId,
        agent_kind: &'static str,
        bid_kind:   &'static str,
    },

    #[error(transparent)]
    Env(#[from] EnvError),
}

pub type MechanismResult<T> = Result<T, MechanismError>;
