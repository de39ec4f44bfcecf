use thiserror::Error;

use ab_assign::AssignError;
use ab_matching::MatchError;
use ab_population::PopulationError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline configuration error: {0}")]
    Config(String),

    #[error("zone index is empty")]
    NoZones,

    #[error("commuting matrix level {got:?} does not match configured {expected:?}")]
    CommuteLevelMismatch {
        expected: ab_spatial::CommuteLevel,
        got:      ab_spatial::CommuteLevel,
    },

    #[error(transparent)]
    Matching(#[from] MatchError),

    #[error(transparent)]
    Assign(#[from] AssignError),

    #[error(transparent)]
    Population(#[from] PopulationError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
