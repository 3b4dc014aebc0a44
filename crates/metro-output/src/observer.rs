//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use metro_core::{DayType, SimTime};
use metro_population::{PopulationStore, Transfer};
use metro_sim::{RunSummary, SimObserver, TickStats};
use metro_timetable::Movement;

use crate::row::{MovementRow, TickSummaryRow, TransferRow, TripRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes movements, pool transfers, tick summaries
/// and, at the end of the run, every passenger trip to any [`OutputWriter`]
/// backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run_with()` returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:         W,
    tick_summaries: bool,
    last_error:     Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            tick_summaries: true,
            last_error:     None,
        }
    }

    /// Skip the per-tick summary rows.
    pub fn without_tick_summaries(mut self) -> Self {
        self.tick_summaries = false;
        self
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_run_start(&mut self, _day_type: DayType, _start: SimTime) {
        self.last_error = None;
    }

    fn on_movements(&mut self, movements: &[Movement]) {
        if movements.is_empty() {
            return;
        }
        let rows: Vec<MovementRow> = movements.iter().map(MovementRow::from).collect();
        let result = self.writer.write_movements(&rows);
        self.store_err(result);
    }

    fn on_transfers(&mut self, transfers: &[Transfer]) {
        if transfers.is_empty() {
            return;
        }
        let rows: Vec<TransferRow> = transfers.iter().map(TransferRow::from).collect();
        let result = self.writer.write_transfers(&rows);
        self.store_err(result);
    }

    fn on_tick_end(&mut self, stats: &TickStats) {
        if !self.tick_summaries {
            return;
        }
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(stats));
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _summary: &RunSummary, store: &PopulationStore) {
        let rows: Vec<TripRow> = store.snapshot().iter().flat_map(TripRow::from_passenger).collect();
        let result = self.writer.write_trips(&rows);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
