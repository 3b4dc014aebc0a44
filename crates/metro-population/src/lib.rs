//! `metro-population` — passengers, trips, and the population store.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`passenger`] | `Passenger`, `Trip`                                       |
//! | [`pool`]      | `StationPools`, `TrainPools` (one `Mutex` per pool)       |
//! | [`store`]     | `PopulationStore`, sorted outside index, transfer log     |
//! | [`generator`] | `generate_population`                                     |
//! | [`error`]     | `PopulationError`, `PopulationResult<T>`                  |
//!
//! # Features
//!
//! | Feature   | Effect                                                  |
//! |-----------|---------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for passenger maps (default)  |

pub mod error;
pub mod generator;
pub mod passenger;
pub mod pool;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::{PopulationError, PopulationResult};
pub use generator::generate_population;
pub use passenger::{Passenger, Trip};
pub use pool::{PassengerMap, StationPools, TrainPools};
pub use store::{DepartStats, Exchange, FlushStats, Location, PopulationStore, Transfer};
