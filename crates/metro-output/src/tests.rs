//! Integration tests for metro-output.

#[cfg(test)]
mod helpers {
    use metro_core::{GeoPoint, LineId, PassengerId, PassengerKind, SimConfig, SimTime, StationId};
    use metro_network::{Network, NetworkBuilder, Path};
    use metro_population::{Passenger, Trip};

    /// 2024-03-04T05:00:00 UTC.
    pub const T0: i64 = 1_709_528_400;

    pub fn config() -> SimConfig {
        let start = "2024-03-04T05:00:00".parse().unwrap();
        let end = "2024-03-04T06:30:00".parse().unwrap();
        SimConfig::new(5, start, end)
    }

    pub fn network() -> Network {
        let mut b = NetworkBuilder::new();
        for i in 0..3 {
            b.add_station(format!("S{i}"), GeoPoint::new(48.80 + 0.01 * i as f64, 2.35), None);
        }
        b.add_line("L0", vec![StationId(0), StationId(1), StationId(2)], 1, None);
        b.build(&config().trains).unwrap()
    }

    pub fn passenger(id: u64, stations: &[u32], dep: i64) -> Passenger {
        let path = Path::along_line(LineId(0), stations.iter().map(|&s| StationId(s)).collect());
        Passenger::new(PassengerId(id), PassengerKind::Student, vec![Trip::new(SimTime(T0 + dep), path)])
    }

    pub fn read(path: &std::path::Path) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    pub fn headers(path: &std::path::Path) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }
}

// ── CSV writer ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use metro_core::SimTime;
    use metro_sim::TickStats;

    use super::helpers::{headers, passenger, read, T0};
    use crate::csv::CsvWriter;
    use crate::row::{MovementRow, TickSummaryRow, TransferRow, TripOutcome, TripRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn movement_row(train: u32, arrival: i64) -> MovementRow {
        MovementRow {
            train,
            line:           0,
            station:        1,
            arrival:        SimTime(T0 + arrival),
            departure:      SimTime(T0 + arrival + 30),
            next_station:   2,
            next_arrival:   SimTime(T0 + arrival + 100),
            next_departure: SimTime(T0 + arrival + 130),
            direction:      "up",
            revenue:        false,
            trip_number:    0,
        }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("movements.csv").exists());
        assert!(dir.path().join("transfers.csv").exists());
        assert!(dir.path().join("trips.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(&dir.path().join("movements.csv")),
            [
                "train", "line", "station", "arrival", "departure", "next_station",
                "next_arrival", "next_departure", "direction", "revenue", "trip_number",
            ]
        );
        assert_eq!(
            headers(&dir.path().join("trips.csv")),
            [
                "passenger", "kind", "trip", "origin", "destination", "departure", "arrival",
                "stations", "transfers", "outcome",
            ]
        );
        assert_eq!(
            headers(&dir.path().join("transfers.csv")),
            ["passenger", "at", "from", "from_id", "to", "to_id"]
        );
        assert_eq!(headers(&dir.path().join("tick_summaries.csv"))[..2], ["tick", "time"]);
    }

    #[test]
    fn transfer_rows_name_both_pools() {
        use metro_core::{PassengerId, StationId, TrainId};
        use metro_population::{Location, Transfer};

        let moves = [
            Transfer {
                passenger: PassengerId(4),
                from:      Location::Outside,
                to:        Location::Station(StationId(2)),
                at:        SimTime(T0 + 60),
            },
            Transfer {
                passenger: PassengerId(4),
                from:      Location::Station(StationId(2)),
                to:        Location::Train(TrainId(1)),
                at:        SimTime(T0 + 90),
            },
        ];
        let rows: Vec<TransferRow> = moves.iter().map(TransferRow::from).collect();
        assert_eq!(rows[0].from_id, None);
        assert_eq!(rows[1].to, "train");

        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_transfers(&rows).unwrap();
        w.finish().unwrap();

        let read_rows = read(&dir.path().join("transfers.csv"));
        assert_eq!(read_rows.len(), 2);
        assert_eq!(read_rows[0].iter().collect::<Vec<_>>(), ["4", "2024-03-04T05:01:00", "outside", "", "station", "2"]);
        assert_eq!(read_rows[1].iter().collect::<Vec<_>>(), ["4", "2024-03-04T05:01:30", "station", "2", "train", "1"]);
    }

    #[test]
    fn movement_rows_use_iso_times() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_movements(&[movement_row(0, 0), movement_row(3, 60)]).unwrap();
        w.finish().unwrap();

        let rows = read(&dir.path().join("movements.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][3], "2024-03-04T05:00:00");
        assert_eq!(&rows[0][4], "2024-03-04T05:00:30");
        assert_eq!(&rows[1][0], "3");
        assert_eq!(&rows[1][8], "up");
        assert_eq!(&rows[1][9], "0");
    }

    #[test]
    fn trip_rows_leave_missing_arrival_empty() {
        let mut done = passenger(7, &[0, 1, 2], 0);
        done.begin_next_trip();
        done.finish_current(SimTime(T0 + 400));
        let waiting = passenger(8, &[2, 1], 60);

        let rows: Vec<TripRow> = [done, waiting].iter().flat_map(TripRow::from_passenger).collect();
        assert_eq!(rows[0].outcome, TripOutcome::Completed);
        assert_eq!(rows[1].outcome, TripOutcome::Pending);

        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_trips(&rows).unwrap();
        w.finish().unwrap();

        let read_rows = read(&dir.path().join("trips.csv"));
        assert_eq!(read_rows.len(), 2);
        assert_eq!(&read_rows[0][0], "7");
        assert_eq!(&read_rows[0][1], "student");
        assert_eq!(&read_rows[0][6], "2024-03-04T05:06:40");
        assert_eq!(&read_rows[0][7], "3");
        assert_eq!(&read_rows[0][9], "completed");
        assert_eq!(&read_rows[1][6], "");
        assert_eq!(&read_rows[1][9], "pending");
    }

    #[test]
    fn tick_summary_from_stats() {
        let stats = TickStats { tick: 4, time: SimTime(T0 + 131), arrivals: 2, boarded: 5, ..TickStats::default() };
        let row = TickSummaryRow::from(&stats);
        assert_eq!(row.boarded, 5);

        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&row).unwrap();
        w.finish().unwrap();

        let rows = read(&dir.path().join("tick_summaries.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "4");
        assert_eq!(&rows[0][1], "2024-03-04T05:02:11");
        assert_eq!(&rows[0][2], "2");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_missing_dir_errors() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn timetable_written_in_movement_layout() {
        use metro_timetable::{Timetable, initial_trains};

        let config = super::helpers::config();
        let network = super::helpers::network();
        let trains = initial_trains(&network, &config.trains, config.start_time());
        let timetable = Timetable::generate(&network, &trains, &config).unwrap();

        let dir = tmp();
        let path = dir.path().join("timetable.csv");
        let n = CsvWriter::write_timetable(&path, &timetable).unwrap();
        assert_eq!(n, timetable.len());
        let rows = read(&path);
        assert_eq!(rows.len(), n);
        assert!(rows.iter().all(|r| &r[0] == "0"));
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use metro_sim::{SimBuilder, SimObserver};

    use super::helpers::{config, network, passenger, read};
    use crate::csv::CsvWriter;
    use crate::observer::SimOutputObserver;
    use crate::row::{MovementRow, TickSummaryRow, TransferRow, TripRow};
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult};

    #[test]
    fn integration_csv() {
        let mut sim = SimBuilder::new(config(), network())
            .passengers(vec![passenger(0, &[0, 1, 2], 0), passenger(1, &[2, 1], 9_000)])
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer);
        let summary = sim.run_with("weekday", 0, &mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        let movements = read(&dir.path().join("movements.csv"));
        assert_eq!(movements.len(), summary.movements);
        assert_eq!(movements.len(), sim.movements().len());

        let summaries = read(&dir.path().join("tick_summaries.csv"));
        assert_eq!(summaries.len() as u64, summary.ticks);

        let trips = read(&dir.path().join("trips.csv"));
        assert_eq!(trips.len(), 2);
        assert_eq!(&trips[0][9], "completed");
        assert_eq!(&trips[1][9], "pending");

        // Passenger 0 enters, boards, alights and leaves; passenger 1 never starts.
        let transfers = read(&dir.path().join("transfers.csv"));
        let pools: Vec<(&str, &str)> = transfers.iter().map(|r| (&r[2], &r[4])).collect();
        assert_eq!(pools, [("outside", "station"), ("station", "train"), ("train", "station"), ("station", "outside")]);
        assert!(transfers.iter().all(|r| &r[0] == "0"));
        assert_eq!(sim.store().transfer_count(), 0);
    }

    #[test]
    fn tick_summaries_can_be_skipped() {
        let mut sim = SimBuilder::new(config(), network()).build().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap()).without_tick_summaries();
        sim.run_with("weekday", 10, &mut obs).unwrap();
        assert!(read(&dir.path().join("tick_summaries.csv")).is_empty());
    }

    /// Fails every write after the first `ok` calls.
    struct Failing {
        ok:    usize,
        calls: usize,
    }

    impl Failing {
        fn check(&mut self) -> OutputResult<()> {
            self.calls += 1;
            if self.calls > self.ok {
                let kind = std::io::ErrorKind::Other;
                return Err(OutputError::Io(std::io::Error::new(kind, format!("write {}", self.calls))));
            }
            Ok(())
        }
    }

    impl OutputWriter for Failing {
        fn write_movements(&mut self, _rows: &[MovementRow]) -> OutputResult<()> {
            self.check()
        }
        fn write_transfers(&mut self, _rows: &[TransferRow]) -> OutputResult<()> {
            self.check()
        }
        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            self.check()
        }
        fn write_trips(&mut self, _rows: &[TripRow]) -> OutputResult<()> {
            self.check()
        }
        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept() {
        let mut sim = SimBuilder::new(config(), network()).build().unwrap();
        let mut obs = SimOutputObserver::new(Failing { ok: 1, calls: 0 });
        sim.run_with("weekday", 5, &mut obs).unwrap();

        let err = obs.take_error().unwrap();
        assert!(err.to_string().contains("write 2"), "{err}");
        assert!(obs.take_error().is_none());
        assert!(obs.into_writer().calls > 2);
    }

    #[test]
    fn empty_tick_writes_no_movements() {
        let mut obs = SimOutputObserver::new(Failing { ok: 0, calls: 0 });
        obs.on_movements(&[]);
        obs.on_transfers(&[]);
        assert!(obs.take_error().is_none());
    }
}
