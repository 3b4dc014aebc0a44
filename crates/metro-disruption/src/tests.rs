//! Unit tests for metro-disruption.

#[cfg(test)]
mod helpers {
    use chrono::NaiveDateTime;

    use metro_core::{
        GeoPoint, LineId, PassengerId, PassengerKind, SimConfig, SimTime, StationId, TrainConfig,
    };
    use metro_network::{Network, NetworkBuilder, Path};
    use metro_population::{Passenger, Trip};

    pub const T0: i64 = 1_709_528_400; // 2024-03-04T05:00:00

    pub fn config() -> SimConfig {
        let start: NaiveDateTime = "2024-03-04T05:00:00".parse().unwrap();
        let end: NaiveDateTime = "2024-03-04T23:00:00".parse().unwrap();
        SimConfig::new(9, start, end)
    }

    /// Stations at the given latitudes (longitude fixed), lines as index lists.
    pub fn network(lats: &[f64], lines: &[&[u32]]) -> Network {
        let mut b = NetworkBuilder::new();
        for (i, lat) in lats.iter().enumerate() {
            b.add_station(format!("S{i}"), GeoPoint::new(*lat, 2.35), None);
        }
        for (k, stops) in lines.iter().enumerate() {
            b.add_line(format!("L{k}"), stops.iter().map(|&s| StationId(s)).collect(), 1, None);
        }
        b.build(&TrainConfig::default()).unwrap()
    }

    pub fn s(i: u32) -> StationId {
        StationId(i)
    }

    pub fn t(offset: i64) -> SimTime {
        SimTime(T0 + offset)
    }

    pub fn path_on(line: u32, stations: &[u32]) -> Path {
        Path::along_line(LineId(line), stations.iter().map(|&i| StationId(i)).collect())
    }

    pub fn traveller(id: u64, dep: SimTime, path: Path) -> Passenger {
        Passenger::new(PassengerId(id), PassengerKind::Adult, vec![Trip::new(dep, path)])
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod schedule {
    use metro_core::SimTime;

    use crate::{Lifecycle, Schedule};

    #[test]
    fn scheduled_active_finished() {
        let mut s = Schedule::new(SimTime(100), SimTime(200));
        assert!(s.advance(SimTime(50)).is_none());
        assert_eq!(s.state(), Lifecycle::Scheduled);

        let t = s.advance(SimTime(100));
        assert!(t.started && !t.ended);
        assert!(s.is_active());

        assert!(s.advance(SimTime(150)).is_none());
        let t = s.advance(SimTime(200));
        assert!(t.ended && !t.started);
        assert_eq!(s.state(), Lifecycle::Finished);
        assert!(s.advance(SimTime(900)).is_none());
    }

    #[test]
    fn start_and_end_in_one_tick() {
        let mut s = Schedule::new(SimTime(100), SimTime(200));
        let t = s.advance(SimTime(300));
        assert!(t.started && t.ended);
        assert_eq!(s.state(), Lifecycle::Finished);
    }
}

// ── Rate curve ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rate_curve {
    use metro_core::{SimTime, TimeWindow};

    use crate::RateCurve;

    fn window(minutes: i64) -> TimeWindow {
        TimeWindow::new(SimTime(0), SimTime(minutes * 60))
    }

    #[test]
    fn sums_exactly_to_size() {
        for (size, width) in [(10, 10.0), (1_000, 7.0), (3, 25.0), (0, 5.0)] {
            let c = RateCurve::gaussian(window(120), SimTime(60 * 60), size, width);
            assert_eq!(c.len(), 120);
            assert_eq!(c.total(), size, "size {size} width {width}");
        }
    }

    #[test]
    fn heaviest_near_the_peak() {
        let c = RateCurve::gaussian(window(60), SimTime(30 * 60), 600, 5.0);
        let max = *c.per_minute().iter().max().unwrap();
        assert!(c.per_minute()[29] == max || c.per_minute()[30] == max);
        assert!(c.per_minute()[0] < max / 10);
    }

    #[test]
    fn degenerate_width_puts_everything_at_the_peak() {
        let c = RateCurve::gaussian(window(60), SimTime(30 * 60), 10, 1e-9);
        assert_eq!(c.per_minute()[30], 10);
        assert_eq!(c.total(), 10);
    }

    #[test]
    fn partial_minute_rounds_up() {
        let c = RateCurve::gaussian(TimeWindow::new(SimTime(0), SimTime(90)), SimTime(0), 4, 1.0);
        assert_eq!(c.len(), 2);
        assert_eq!(c.sum_range(0, 99), 4);
        assert_eq!(c.sum_range(1, 1), 0);
    }
}

// ── Station closures ──────────────────────────────────────────────────────────

#[cfg(test)]
mod station_closure {
    use metro_core::{PassengerId, SimRng, TrainId};
    use metro_population::{Location, PopulationStore};
    use metro_timetable::initial_trains;

    use super::helpers::{config, network, path_on, s, t, traveller};
    use crate::{Disruptions, Schedule, StationClosure};

    fn closing(station: u32, from: i64, to: i64) -> Disruptions {
        let mut d = Disruptions::new();
        d.push_station_closure(StationClosure { station: s(station), schedule: Schedule::new(t(from), t(to)) });
        d
    }

    #[test]
    fn drops_two_station_trip_through_closed_station() {
        let mut net = network(&[48.80, 48.81, 48.82], &[&[0, 1, 2]]);
        let cfg = config();
        let mut store = PopulationStore::new(3, 0);
        store.insert_outside(traveller(0, t(600), path_on(0, &[1, 2])));
        store.insert_outside(traveller(1, t(600), path_on(0, &[0, 1])));
        // Departs after the closure ends: untouched.
        store.insert_outside(traveller(2, t(9_000), path_on(0, &[1, 2])));

        let mut d = closing(1, 0, 3_600);
        let report = d
            .apply_tick(t(60), &mut net, &mut [], &mut store, &cfg, &mut SimRng::new(1))
            .unwrap();

        assert_eq!(report.started, 1);
        assert!(report.rebuilt);
        assert_eq!(report.reroute.dropped_trips, 2);
        assert!(store.outside()[&PassengerId(0)].trips.is_empty());
        assert!(store.outside()[&PassengerId(1)].trips.is_empty());
        assert_eq!(store.outside()[&PassengerId(2)].trips.len(), 1);
        assert!(store.outside_index_is_consistent());
        assert!(!net.is_open(s(1)));
    }

    #[test]
    fn pending_trip_gets_new_start() {
        // L0: 0-1-2-3, L1: 1-4 ; closing 0 moves a 0→3 trip to start at 1.
        let mut net = network(&[48.80, 48.81, 48.82, 48.83, 48.811], &[&[0, 1, 2, 3], &[1, 4]]);
        let mut store = PopulationStore::new(5, 0);
        store.insert_outside(traveller(0, t(600), path_on(0, &[0, 1, 2, 3])));

        let mut d = closing(0, 0, 3_600);
        let report = d
            .apply_tick(t(60), &mut net, &mut [], &mut store, &config(), &mut SimRng::new(1))
            .unwrap();
        assert_eq!(report.reroute.rerouted, 1);
        let trip = &store.outside()[&PassengerId(0)].trips[0];
        assert_eq!(trip.path.stations(), &[s(1), s(2), s(3)]);
    }

    #[test]
    fn evicts_with_walking_trip() {
        // Station 2 is much closer to 1 than station 0 is.
        let mut net = network(&[48.80, 48.81, 48.815, 48.83], &[&[0, 1, 2, 3]]);
        let mut store = PopulationStore::new(4, 0);
        let mut p = traveller(0, t(0), path_on(0, &[1, 2, 3]));
        p.begin_next_trip();
        store.enter_station(p, s(1), t(0));
        let mut q = traveller(1, t(0), path_on(0, &[1, 2]));
        q.begin_next_trip();
        store.enter_station(q, s(1), t(0));

        let mut d = closing(1, 0, 3_600);
        let report = d
            .apply_tick(t(60), &mut net, &mut [], &mut store, &config(), &mut SimRng::new(1))
            .unwrap();

        assert_eq!(report.reroute.evicted, 2);
        assert_eq!(report.reroute.walking, 1);
        assert_eq!(store.location_of(PassengerId(0)), Some(Location::Outside));
        assert_eq!(store.stations().lock(s(1)).len(), 0);

        let walker = &store.outside()[&PassengerId(0)];
        assert!(walker.trips[0].abandoned);
        assert_eq!(walker.trips[0].arrival, Some(t(60)));
        let walk = &walker.trips[1];
        assert_eq!(walk.path.stations(), &[s(2), s(3)]);
        let secs = net.station(s(1)).position.walking_secs(net.station(s(2)).position);
        assert_eq!(walk.departure, t(60 + secs));
        assert_eq!(walker.next_departure(), Some(walk.departure));

        // Only two stations left: no walking trip.
        assert_eq!(store.outside()[&PassengerId(1)].trips.len(), 1);
        store.check_exclusive().unwrap();
    }

    #[test]
    fn waiting_elsewhere_rerouted_or_flushed() {
        // L0: 0-1-2-3, L1: 0-4-2 bypasses station 1.  L2: 5-1 has no bypass.
        let lats = [48.80, 48.81, 48.82, 48.83, 48.812, 48.79];
        let mut net = network(&lats, &[&[0, 1, 2, 3], &[0, 4, 2], &[5, 1]]);
        let mut store = PopulationStore::new(6, 0);
        let mut a = traveller(0, t(0), path_on(0, &[0, 1, 2, 3]));
        a.begin_next_trip();
        store.enter_station(a, s(0), t(0));
        let mut b = traveller(1, t(0), path_on(2, &[5, 1]));
        b.begin_next_trip();
        store.enter_station(b, s(5), t(0));

        let mut d = closing(1, 0, 3_600);
        let report = d
            .apply_tick(t(60), &mut net, &mut [], &mut store, &config(), &mut SimRng::new(1))
            .unwrap();

        assert_eq!(report.reroute.rerouted, 1);
        assert_eq!(report.reroute.flushed, 1);
        let waiting = store.stations().lock(s(0));
        let rerouted = waiting[&PassengerId(0)].current_trip().unwrap();
        assert_eq!(rerouted.path.stations(), &[s(0), s(4), s(2), s(3)]);
        drop(waiting);

        let gave_up = &store.outside()[&PassengerId(1)];
        assert!(gave_up.trips[0].abandoned);
        assert!(!gave_up.is_travelling());
    }

    #[test]
    fn riders_rerouted_from_next_open_stop() {
        let mut net = network(&[48.80, 48.81, 48.82, 48.83], &[&[0, 1, 2, 3]]);
        let cfg = config();
        let mut trains = initial_trains(&net, &cfg.trains, t(0));
        assert_eq!((trains[0].current, trains[0].next), (s(0), s(1)));

        let mut store = PopulationStore::new(4, 1);
        let mut through = traveller(0, t(0), path_on(0, &[0, 1, 2, 3]));
        through.begin_next_trip();
        let mut to_closed = traveller(1, t(0), path_on(0, &[0, 1]));
        to_closed.begin_next_trip();
        let riders = store.trains_mut().get_mut(TrainId(0));
        riders.insert(through.id, through);
        riders.insert(to_closed.id, to_closed);

        let mut d = closing(1, 0, 3_600);
        d.apply_tick(t(10), &mut net, &mut trains, &mut store, &cfg, &mut SimRng::new(1))
            .unwrap();

        let riders = store.trains().lock(TrainId(0));
        let a = riders[&PassengerId(0)].current_trip().unwrap();
        assert_eq!(a.path.stations(), &[s(2), s(3)]);
        let b = riders[&PassengerId(1)].current_trip().unwrap();
        assert_eq!(b.path.stations(), &[s(2)]);
    }

    #[test]
    fn overlapping_closures_keep_station_closed() {
        let mut net = network(&[48.80, 48.81, 48.82], &[&[0, 1, 2]]);
        let cfg = config();
        let mut store = PopulationStore::new(3, 0);
        let mut rng = SimRng::new(1);
        let mut d = closing(1, 100, 300);
        d.push_station_closure(StationClosure { station: s(1), schedule: Schedule::new(t(200), t(400)) });

        d.apply_tick(t(250), &mut net, &mut [], &mut store, &cfg, &mut rng).unwrap();
        assert!(!net.is_open(s(1)));
        let r = d.apply_tick(t(350), &mut net, &mut [], &mut store, &cfg, &mut rng).unwrap();
        assert_eq!(r.ended, 1);
        assert!(!net.is_open(s(1)));
        d.apply_tick(t(400), &mut net, &mut [], &mut store, &cfg, &mut rng).unwrap();
        assert!(net.is_open(s(1)));
        assert!(net.graph().path(s(0), s(2)).is_some());
    }
}

// ── Line closures ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod line_closure {
    use metro_core::{LineId, PassengerId, SimRng};
    use metro_population::PopulationStore;

    use super::helpers::{config, network, path_on, s, t, traveller};
    use crate::{Disruptions, LineClosure, Schedule};

    #[test]
    fn span_closure_truncates_waiting_passenger() {
        let mut net = network(&[48.80, 48.81, 48.82, 48.83], &[&[0, 1, 2, 3]]);
        let mut store = PopulationStore::new(4, 0);
        let mut p = traveller(0, t(0), path_on(0, &[0, 1, 2, 3]));
        p.begin_next_trip();
        store.enter_station(p, s(0), t(0));
        // Unaffected: never crosses the closed hop.
        let mut q = traveller(1, t(0), path_on(0, &[0, 1]));
        q.begin_next_trip();
        store.enter_station(q, s(0), t(0));

        let mut d = Disruptions::new();
        d.push_line_closure(LineClosure {
            line: LineId(0),
            from: s(1),
            to: s(2),
            schedule: Schedule::new(t(0), t(3_600)),
        });
        let report = d
            .apply_tick(t(60), &mut net, &mut [], &mut store, &config(), &mut SimRng::new(1))
            .unwrap();

        assert_eq!(report.reroute.truncated, 1);
        assert_eq!(report.reroute.evicted, 0);
        assert!((0..4).all(|i| net.is_open(s(i))));
        let waiting = store.stations().lock(s(0));
        assert_eq!(waiting[&PassengerId(0)].current_trip().unwrap().path.stations(), &[s(0), s(1)]);
        assert_eq!(waiting[&PassengerId(1)].current_trip().unwrap().path.stations(), &[s(0), s(1)]);
        drop(waiting);

        d.apply_tick(t(3_600), &mut net, &mut [], &mut store, &config(), &mut SimRng::new(1))
            .unwrap();
        assert!(net.graph().path(s(0), s(3)).is_some());
    }
}

// ── Delays ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod delay {
    use metro_core::SimRng;
    use metro_population::PopulationStore;
    use metro_timetable::initial_trains;

    use super::helpers::{config, network, s, t};
    use crate::{Disruptions, LineDelay, Schedule};

    #[test]
    fn delay_pushes_and_releases_trains_on_the_edge() {
        let mut net = network(&[48.80, 48.81, 48.82], &[&[0, 1, 2], &[2, 1]]);
        let cfg = config();
        let mut trains = initial_trains(&net, &cfg.trains, t(0));
        let on_edge = trains[0].arrival_next;
        let elsewhere = trains[1].arrival_next;
        let mut store = PopulationStore::new(3, trains.len());
        let mut rng = SimRng::new(1);

        let mut d = Disruptions::new();
        d.push_line_delay(LineDelay {
            from: s(1),
            to: s(0),
            delay_secs: 120,
            schedule: Schedule::new(t(5), t(15)),
        });

        let r = d.apply_tick(t(10), &mut net, &mut trains, &mut store, &cfg, &mut rng).unwrap();
        assert_eq!(r.delayed, 1);
        assert_eq!(trains[0].arrival_next, on_edge + 120);
        assert_eq!(trains[1].arrival_next, elsewhere);
        assert_eq!(net.delays().get(s(0), s(1)), 120);

        d.apply_tick(t(20), &mut net, &mut trains, &mut store, &cfg, &mut rng).unwrap();
        assert_eq!(trains[0].arrival_next, on_edge);
        assert!(net.delays().is_clear());
    }

    #[test]
    fn reprojection_never_goes_back_in_time() {
        let mut net = network(&[48.80, 48.81], &[&[0, 1]]);
        let cfg = config();
        let mut trains = initial_trains(&net, &cfg.trains, t(0));
        let mut store = PopulationStore::new(2, 1);
        let mut d = Disruptions::new();
        d.push_line_delay(LineDelay {
            from: s(0),
            to: s(1),
            delay_secs: -10_000,
            schedule: Schedule::new(t(0), t(50)),
        });
        d.apply_tick(t(20), &mut net, &mut trains, &mut store, &cfg, &mut SimRng::new(1)).unwrap();
        assert_eq!(trains[0].arrival_next, t(20));
    }
}

// ── Attendance peaks ──────────────────────────────────────────────────────────

#[cfg(test)]
mod attendance_peak {
    use std::collections::HashSet;

    use metro_core::SimRng;
    use metro_population::PopulationStore;

    use super::helpers::{config, network, s, t};
    use crate::{AttendancePeak, Disruptions, Schedule};

    #[test]
    fn injects_exactly_size_by_the_end() {
        let mut net = network(&[48.80, 48.81, 48.82], &[&[0, 1, 2]]);
        let cfg = config();
        let mut store = PopulationStore::new(3, 0);
        let mut rng = SimRng::new(4);

        let mut d = Disruptions::new();
        d.push_attendance_peak(AttendancePeak::new(
            s(1),
            t(1_800),
            10,
            10.0,
            Schedule::new(t(0), t(3_600)),
        ));

        let mut injected = 0;
        for now in [600, 1_500, 1_830, 2_400, 3_000, 3_700] {
            injected += d
                .apply_tick(t(now), &mut net, &mut [], &mut store, &cfg, &mut rng)
                .unwrap()
                .injected;
        }
        assert_eq!(injected, 10);
        assert_eq!(d.attendance_peaks()[0].injected(), 10);

        let waiting = store.stations().lock(s(1));
        assert_eq!(waiting.len(), 10);
        let ids: HashSet<_> = waiting.keys().collect();
        assert_eq!(ids.len(), 10);
        for p in waiting.values() {
            let dest = p.destination().unwrap();
            assert_ne!(dest, s(1));
            assert_eq!(p.current_trip().unwrap().origin(), Some(s(1)));
        }
    }

    #[test]
    fn inject_follows_the_minute_cursor() {
        let mut net = network(&[48.80, 48.81], &[&[0, 1]]);
        let cfg = config();
        let mut store = PopulationStore::new(2, 0);
        let mut rng = SimRng::new(4);
        let peak = AttendancePeak::new(s(0), t(300), 50, 2.0, Schedule::new(t(0), t(600)));
        let first_five: u32 = peak.rates().sum_range(0, 5);

        let mut d = Disruptions::new();
        d.push_attendance_peak(peak);
        let r = d.apply_tick(t(330), &mut net, &mut [], &mut store, &cfg, &mut rng).unwrap();
        assert_eq!(r.injected as u32, first_five);
        let r = d.apply_tick(t(359), &mut net, &mut [], &mut store, &cfg, &mut rng).unwrap();
        assert_eq!(r.injected, 0);
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::helpers::network;
    use crate::EventDefinitions;

    const JSON: &str = r#"{
        "station_closures": [
            { "station": "S1", "start": "2024-03-04T08:00:00", "end": "2024-03-04T09:00:00" },
            { "station": "S1", "start": "tomorrow",            "end": "2024-03-04T09:00:00" },
            { "station": "Nowhere", "start": "2024-03-04T08:00:00", "end": "2024-03-04T09:00:00" }
        ],
        "line_closures": [
            { "line": "L0", "from": "S0", "to": 2, "start": "2024-03-04T08:00:00", "end": "2024-03-04T09:00:00" },
            { "line": "L9", "from": "S0", "to": "S1", "start": "2024-03-04T08:00:00", "end": "2024-03-04T09:00:00" }
        ],
        "line_delays": [
            { "from": "S0", "to": "S1", "delay_secs": 60, "start": "2024-03-04T09:00:00", "end": "2024-03-04T08:00:00" }
        ],
        "attendance_peaks": [
            { "station": 1, "peak": "2024-03-04T18:00:00Z", "size": 100, "width_minutes": 15,
              "start": "2024-03-04T17:00:00", "end": "2024-03-04T19:00:00" }
        ]
    }"#;

    #[test]
    fn loads_valid_events_and_skips_the_rest() {
        let net = network(&[48.80, 48.81, 48.82], &[&[0, 1, 2]]);
        let d = EventDefinitions::from_json_reader(JSON.as_bytes()).unwrap().into_disruptions(&net);
        assert_eq!(d.station_closures().len(), 1);
        assert_eq!(d.line_closures().len(), 1);
        assert!(d.line_delays().is_empty());
        assert_eq!(d.attendance_peaks().len(), 1);
        assert_eq!(d.attendance_peaks()[0].rates().total(), 100);
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn empty_file_is_fine() {
        let net = network(&[48.80, 48.81], &[&[0, 1]]);
        let d = EventDefinitions::from_json_reader("{}".as_bytes()).unwrap().into_disruptions(&net);
        assert!(d.is_empty());
    }
}
