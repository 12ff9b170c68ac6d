//! Base error type.
//!
//! Each `sky-*` crate defines its own enum and wraps `SkyError` as one
//! variant via `#[from]`, so `?` works across the layer stack.

use thiserror::Error;

use crate::Coordinate4D;

#[derive(Debug, Error)]
pub enum SkyError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("world dimension {0} must be positive on every axis")]
    InvalidDimension(Coordinate4D),

    #[error("min height {min_height} outside world height {height}")]
    InvalidMinHeight { min_height: i64, height: i64 },
}

/// Shorthand result type for `sky-core`.
pub type SkyResult<T> = Result<T, SkyError>;
