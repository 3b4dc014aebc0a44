use thiserror::Error;

use metro_network::NetworkError;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("timetable configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

pub type TimetableResult<T> = Result<T, TimetableError>;
