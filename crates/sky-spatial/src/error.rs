//! Spatial-subsystem error type.

use thiserror::Error;

use sky_core::{BlockerId, SkyError};

/// Errors produced by `sky-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("blocker {0} produces no index interval")]
    EmptyBlocker(BlockerId),

    #[error("blocker count {0} exceeds the id space")]
    TooManyBlockers(usize),

    #[error(transparent)]
    Core(#[from] SkyError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
