//! `metro-output` — simulation output writers for the metro passenger simulator.
//!
//! | Backend | Files created                                                         |
//! |---------|-----------------------------------------------------------------------|
//! | CSV     | `movements.csv`, `transfers.csv`, `trips.csv`, `tick_summaries.csv`   |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `metro_sim::SimObserver`.
//! [`CsvWriter::write_timetable`] writes the planned timetable separately.
//!
//! # Usage
//!
//! ```rust,ignore
//! use metro_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run_with("weekday", 0, &mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{MovementRow, TickSummaryRow, TransferRow, TripOutcome, TripRow};
pub use writer::OutputWriter;
