//! Environment error type.
//!
//! Every variant is an invariant violation: callers are expected to abort
//! rather than continue on a possibly corrupted index.

use thiserror::Error;

use sky_agent::AgentError;
use sky_core::{AgentId, SkyError};
use sky_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("{0} is not registered in the environment")]
    UnknownAgent(AgentId),

    #[error("{0} is already registered")]
    DuplicateAgent(AgentId),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] SkyError),
}

pub type EnvResult<T> = Result<T, EnvError>;
