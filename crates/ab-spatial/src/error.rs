//! Spatial-subsystem error type.

use thiserror::Error;

use ab_core::{CoreError, ZoneId};

/// Errors produced by `ab-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("unknown zone code {0:?}")]
    UnknownZoneCode(String),

    #[error("zone code {0:?} appears more than once")]
    DuplicateZoneCode(String),

    #[error("zone {0} not found in index")]
    ZoneNotFound(ZoneId),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("spatial input parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
