//! Network-subsystem error type.

use thiserror::Error;

use metro_core::{LineId, StationId};

/// Errors produced by `metro-network`.
///
/// Every variant is a configuration-time failure: once a network has been
/// built, missing paths are reported as `None`, never as an error.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network configuration error: {0}")]
    Config(String),

    #[error("invalid path from {from} to {to}: {reason}")]
    InvalidPath { from: StationId, to: StationId, reason: &'static str },

    #[error("transfer closure did not settle after {passes} passes")]
    ClosureDiverged { passes: usize },

    #[error("cannot join a path ending at {tail} to one starting at {head}")]
    Discontiguous { tail: StationId, head: StationId },

    #[error("station {0:?} is not defined")]
    UnknownStation(String),

    #[error("station {0} not found in network")]
    StationNotFound(StationId),

    #[error("{station} is not served by {line}")]
    NotOnLine { station: StationId, line: LineId },

    #[error("line {0} not found in network")]
    LineNotFound(LineId),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
