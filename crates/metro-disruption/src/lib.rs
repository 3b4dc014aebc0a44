//! `metro-disruption` — closures, delays, attendance peaks, and rerouting.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`schedule`] | `Schedule`, `Lifecycle`, `Transition`                      |
//! | [`events`]   | `StationClosure`, `LineClosure`, `LineDelay`, `AttendancePeak` |
//! | [`peak`]     | `RateCurve` — per-minute Gaussian arrival counts           |
//! | [`reroute`]  | `Closure`, `reroute`, `RerouteStats`                       |
//! | [`engine`]   | `Disruptions` (all event lists), `TickReport`              |
//! | [`loader`]   | `EventDefinitions` — JSON → `Disruptions`                  |
//! | [`error`]    | `DisruptionError`, `DisruptionResult<T>`                   |

pub mod engine;
pub mod error;
pub mod events;
pub mod loader;
pub mod peak;
pub mod reroute;
pub mod schedule;

#[cfg(test)]
mod tests;

pub use engine::{Disruptions, TickReport};
pub use error::{DisruptionError, DisruptionResult};
pub use events::{AttendancePeak, LineClosure, LineDelay, StationClosure};
pub use loader::EventDefinitions;
pub use peak::RateCurve;
pub use reroute::{Closure, RerouteStats, reroute};
pub use schedule::{Lifecycle, Schedule, Transition};
