//! Simulation observer trait for progress reporting and data collection.

use metro_core::{DayType, SimTime};
use metro_population::{PopulationStore, Transfer};
use metro_timetable::Movement;

use crate::{RunSummary, TickStats};

/// Callbacks invoked by [`Simulation::run_with`][crate::Simulation::run_with]
/// at key points of the run.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SimObserver for Progress {
///     fn on_tick_end(&mut self, stats: &TickStats) {
///         if stats.tick % 100 == 0 {
///             println!("{}: {} trains arrived", stats.time, stats.arrivals);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once before the first tick.
    fn on_run_start(&mut self, _day_type: DayType, _start: SimTime) {}

    /// Called after every tick with the movements that tick produced,
    /// ordered by train id.
    fn on_movements(&mut self, _movements: &[Movement]) {}

    /// Called after every tick with the pool moves that tick made, grouped by
    /// passenger id.
    fn on_transfers(&mut self, _transfers: &[Transfer]) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _stats: &TickStats) {}

    /// Called once after the final tick.  `store` holds every passenger with
    /// their trips as they stand at the end of the run.
    fn on_sim_end(&mut self, _summary: &RunSummary, _store: &PopulationStore) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
