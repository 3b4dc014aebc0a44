use thiserror::Error;

use metro_core::PassengerId;
use metro_network::NetworkError;

#[derive(Debug, Error)]
pub enum PopulationError {
    #[error("population configuration error: {0}")]
    Config(String),

    #[error("{0} is not in the expected pool")]
    Misplaced(PassengerId),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

pub type PopulationResult<T> = Result<T, PopulationError>;
