//! `metro-core` — foundational types for the metro passenger simulator.
//!
//! Every other `metro-*` crate depends on this one.  It has no `metro-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`ids`]         | `StationId`, `LineId`, `TrainId`, `PassengerId`        |
//! | [`geo`]         | `GeoPoint`, haversine distance, walking time           |
//! | [`time`]        | `SimTime`, `TimeWindow`                                |
//! | [`config`]      | `SimConfig` and its sections, `DayType`                |
//! | [`kind`]        | `PassengerKind`, `TripPattern`                         |
//! | [`rng`]         | `SimRng`                                               |
//! | [`error`]       | `CoreError`, `CoreResult`                              |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    BusinessDay, DayType, KindProportions, PopulationConfig, SimConfig, TrainConfig,
    TripPatternProportions,
};
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{LineId, PassengerId, StationId, TrainId};
pub use kind::{PassengerKind, TripPattern};
pub use rng::SimRng;
pub use time::{SimTime, TimeWindow};
