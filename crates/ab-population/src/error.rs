use thiserror::Error;

use ab_core::CoreError;
use ab_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum PopulationError {
    #[error("population parse error: {0}")]
    Parse(String),

    #[error("{kind} id {id} appears more than once")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("{kind} {id} references unknown household {household}")]
    UnknownHousehold { kind: &'static str, id: u32, household: u32 },

    #[error("trip references unknown diary person {0}")]
    UnknownDiaryPerson(u32),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type PopulationResult<T> = Result<T, PopulationError>;
