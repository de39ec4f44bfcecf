use thiserror::Error;

use ab_population::PopulationError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("matching configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Population(#[from] PopulationError),
}

pub type MatchResult<T> = Result<T, MatchError>;
