//! Assignment error type.
//!
//! Only setup problems are errors.  Everything that can go wrong for a
//! single activity or origin is a diagnostic instead.

use thiserror::Error;

use ab_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum AssignError {
    #[error("assignment configuration error: {0}")]
    Config(String),

    #[error("feasibility requested without a POI index")]
    MissingPoiIndex,

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type AssignResult<T> = Result<T, AssignError>;
