//! `metro-sim` — event-driven tick loop for the metro passenger simulator.
//!
//! # Tick loop
//!
//! ```text
//! while now < end and ticks < budget:
//!   ① Time        — new_time = earliest train arrival + dwell
//!                   (> now, clamped to end; +60 s when no train runs).
//!   ② Disruptions — transitions, closures, one graph rebuild, rerouting,
//!                   delays, attendance-peak injection.
//!   ③ Departures  — outside passengers due before new_time enter stations.
//!   ④ Flush       — arrivals and over-long waits leave their stations.
//!   ⑤ Trains      — each due train arrives, alights/boards, logs a movement
//!                   (parallel with the `parallel` feature).
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the train phase on Rayon's thread pool (default). |
//! | `fx-hash`  | FxHash passenger maps (forwarded to metro-population). |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use metro_sim::SimBuilder;
//!
//! let mut sim = SimBuilder::new(config, network).disruptions(events).build()?;
//! let summary = sim.run("weekday", 0)?;
//! println!("{} movements", summary.movements);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod report;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use report::{RunSummary, TickStats, TripCounts};
pub use sim::Simulation;
