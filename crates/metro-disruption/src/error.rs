use thiserror::Error;

use metro_network::NetworkError;
use metro_population::PopulationError;

#[derive(Debug, Error)]
pub enum DisruptionError {
    #[error("disruption definition error: {0}")]
    Config(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Population(#[from] PopulationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DisruptionResult<T> = Result<T, DisruptionError>;
