use metro_core::CoreError;
use metro_disruption::DisruptionError;
use metro_network::NetworkError;
use metro_population::PopulationError;
use metro_timetable::TimetableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("timetable error: {0}")]
    Timetable(#[from] TimetableError),

    #[error("population error: {0}")]
    Population(#[from] PopulationError),

    #[error("disruption error: {0}")]
    Disruption(#[from] DisruptionError),
}

pub type SimResult<T> = Result<T, SimError>;
