//! CSV output backend.
//!
//! Creates four files in the configured output directory:
//! - `movements.csv`
//! - `transfers.csv`
//! - `trips.csv`
//! - `tick_summaries.csv`
//!
//! Times are written as ISO-8601 (`2024-03-04T07:30:00`); a missing id or
//! arrival is an empty field.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use metro_timetable::Timetable;

use crate::writer::OutputWriter;
use crate::{MovementRow, OutputResult, TickSummaryRow, TransferRow, TripRow};

const MOVEMENT_HEADER: [&str; 11] = [
    "train",
    "line",
    "station",
    "arrival",
    "departure",
    "next_station",
    "next_arrival",
    "next_departure",
    "direction",
    "revenue",
    "trip_number",
];

/// Writes simulation output to four CSV files.
pub struct CsvWriter {
    movements: Writer<File>,
    transfers: Writer<File>,
    trips:     Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut movements = Writer::from_path(dir.join("movements.csv"))?;
        movements.write_record(MOVEMENT_HEADER)?;

        let mut transfers = Writer::from_path(dir.join("transfers.csv"))?;
        transfers.write_record(["passenger", "at", "from", "from_id", "to", "to_id"])?;

        let mut trips = Writer::from_path(dir.join("trips.csv"))?;
        trips.write_record([
            "passenger", "kind", "trip", "origin", "destination", "departure", "arrival",
            "stations", "transfers", "outcome",
        ])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick", "time", "arrivals", "entered", "boarded", "alighted", "arrived", "timed_out",
            "injected",
        ])?;

        Ok(Self {
            movements,
            transfers,
            trips,
            summaries,
            finished: false,
        })
    }

    /// Write the planned, undisrupted timetable to `path` in the movement
    /// layout.  Returns the number of rows written.
    pub fn write_timetable(path: &Path, timetable: &Timetable) -> OutputResult<usize> {
        let mut w = Writer::from_path(path)?;
        w.write_record(MOVEMENT_HEADER)?;
        let mut n = 0;
        for m in timetable.iter() {
            write_movement(&mut w, &MovementRow::from(m))?;
            n += 1;
        }
        w.flush()?;
        Ok(n)
    }
}

fn write_movement(w: &mut Writer<File>, row: &MovementRow) -> OutputResult<()> {
    w.write_record(&[
        row.train.to_string(),
        row.line.to_string(),
        row.station.to_string(),
        row.arrival.to_string(),
        row.departure.to_string(),
        row.next_station.to_string(),
        row.next_arrival.to_string(),
        row.next_departure.to_string(),
        row.direction.to_string(),
        (row.revenue as u8).to_string(),
        row.trip_number.to_string(),
    ])?;
    Ok(())
}

impl OutputWriter for CsvWriter {
    fn write_movements(&mut self, rows: &[MovementRow]) -> OutputResult<()> {
        for row in rows {
            write_movement(&mut self.movements, row)?;
        }
        Ok(())
    }

    fn write_transfers(&mut self, rows: &[TransferRow]) -> OutputResult<()> {
        let id = |id: Option<u32>| id.map(|i| i.to_string()).unwrap_or_default();
        for row in rows {
            self.transfers.write_record(&[
                row.passenger.to_string(),
                row.at.to_string(),
                row.from.to_string(),
                id(row.from_id),
                row.to.to_string(),
                id(row.to_id),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.time.to_string(),
            row.arrivals.to_string(),
            row.entered.to_string(),
            row.boarded.to_string(),
            row.alighted.to_string(),
            row.arrived.to_string(),
            row.timed_out.to_string(),
            row.injected.to_string(),
        ])?;
        Ok(())
    }

    fn write_trips(&mut self, rows: &[TripRow]) -> OutputResult<()> {
        for row in rows {
            self.trips.write_record(&[
                row.passenger.to_string(),
                row.kind.to_string(),
                row.trip.to_string(),
                row.origin.to_string(),
                row.destination.to_string(),
                row.departure.to_string(),
                row.arrival.map(|t| t.to_string()).unwrap_or_default(),
                row.stations.to_string(),
                row.transfers.to_string(),
                row.outcome.as_str().to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.movements.flush()?;
        self.transfers.flush()?;
        self.trips.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
