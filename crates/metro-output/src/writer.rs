//! The `OutputWriter` trait implemented by output backends.

use crate::{MovementRow, OutputResult, TickSummaryRow, TransferRow, TripRow};

/// Sink for everything a run produces.
///
/// Errors are returned here and stored by
/// [`SimOutputObserver`][crate::SimOutputObserver], which retrieves them with
/// [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of train movements.
    fn write_movements(&mut self, rows: &[MovementRow]) -> OutputResult<()>;

    /// Write a batch of passenger moves between pools.
    fn write_transfers(&mut self, rows: &[TransferRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write passenger trips, normally once at the end of the run.
    fn write_trips(&mut self, rows: &[TripRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
