//! Per-tick statistics and the end-of-run summary.

use metro_core::{DayType, SimTime};
use metro_disruption::TickReport;
use metro_population::{DepartStats, FlushStats, PopulationStore};

/// What one call to [`Simulation::run_once`][crate::Simulation::run_once] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// 1-based tick counter.
    pub tick:       u64,
    /// Time before the tick.
    pub from:       SimTime,
    /// Time after the tick.
    pub time:       SimTime,
    /// Trains that reached a station.
    pub arrivals:   usize,
    pub disruption: TickReport,
    pub departed:   DepartStats,
    pub flushed:    FlushStats,
    pub alighted:   usize,
    pub boarded:    usize,
}

/// Outcome counts over every trip of every passenger.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TripCounts {
    pub completed: usize,
    pub abandoned: usize,
    /// Started but not finished when the run stopped.
    pub ongoing:   usize,
    /// Not started.
    pub pending:   usize,
}

impl TripCounts {
    pub fn from_store(store: &PopulationStore) -> Self {
        let mut counts = Self::default();
        for p in store.snapshot() {
            for (i, trip) in p.trips.iter().enumerate() {
                match (trip.arrival, trip.abandoned) {
                    (Some(_), true)  => counts.abandoned += 1,
                    (Some(_), false) => counts.completed += 1,
                    (None, _) if p.current_index() == Some(i) => counts.ongoing += 1,
                    (None, _) => counts.pending += 1,
                }
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.completed + self.abandoned + self.ongoing + self.pending
    }
}

/// Returned by [`Simulation::run`][crate::Simulation::run].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub day_type:   DayType,
    pub start:      SimTime,
    pub end:        SimTime,
    /// Ticks executed by this run.
    pub ticks:      u64,
    /// Movement records logged by this run.
    pub movements:  usize,
    pub passengers: usize,
    pub trips:      TripCounts,
    pub boarded:    usize,
    pub alighted:   usize,
    /// Passengers created by attendance peaks.
    pub injected:   usize,
    /// Disruption transitions (starts and ends).
    pub started:    usize,
    pub ended:      usize,
}
