//! Unit tests for metro-population.

#[cfg(test)]
mod helpers {
    use metro_core::{GeoPoint, LineId, PassengerId, PassengerKind, SimTime, StationId, TrainConfig};
    use metro_network::{Network, NetworkBuilder, Path};

    use crate::{Passenger, Trip};

    /// Line 0: stations 0-1-2.
    pub fn network() -> Network {
        let mut b = NetworkBuilder::new();
        let stops: Vec<StationId> = (0..3)
            .map(|i| b.add_station(format!("S{i}"), GeoPoint::new(48.80 + 0.01 * i as f64, 2.35), None))
            .collect();
        b.add_line("1", stops, 1, None);
        b.build(&TrainConfig::default()).unwrap()
    }

    pub fn path(stations: &[u32]) -> Path {
        Path::along_line(LineId(0), stations.iter().map(|&s| StationId(s)).collect())
    }

    pub fn trip(dep: i64, stations: &[u32]) -> Trip {
        Trip::new(SimTime(dep), path(stations))
    }

    pub fn passenger(id: u64, trips: Vec<Trip>) -> Passenger {
        Passenger::new(PassengerId(id), PassengerKind::Adult, trips)
    }
}

// ── Passenger lifecycle ───────────────────────────────────────────────────────

#[cfg(test)]
mod passenger {
    use metro_core::{SimTime, StationId};

    use super::helpers::{passenger, trip};

    #[test]
    fn next_trip_is_earliest_incomplete() {
        let p = passenger(0, vec![trip(500, &[1, 0]), trip(100, &[0, 1])]);
        assert_eq!(p.next_departure(), Some(SimTime(100)));
        assert!(!p.is_travelling());
    }

    #[test]
    fn begin_and_finish() {
        let mut p = passenger(0, vec![trip(100, &[0, 1]), trip(500, &[1, 0])]);
        assert_eq!(p.begin_next_trip(), Some(StationId(0)));
        assert_eq!(p.last_station_arrival, SimTime(100));
        assert_eq!(p.destination(), Some(StationId(1)));
        assert_eq!(p.next_departure(), Some(SimTime(500)));

        p.finish_current(SimTime(400));
        assert!(!p.is_travelling());
        assert_eq!(p.trips[0].arrival, Some(SimTime(400)));
        assert!(!p.trips[0].abandoned);
        assert_eq!(p.next_departure(), Some(SimTime(500)));

        p.begin_next_trip();
        p.abandon_current(SimTime(900));
        assert!(p.trips[1].abandoned);
        assert_eq!(p.next_departure(), None);
    }

    #[test]
    fn drop_current_removes_trip() {
        let mut p = passenger(0, vec![trip(100, &[0, 1]), trip(500, &[1, 0])]);
        p.begin_next_trip();
        p.drop_current();
        assert_eq!(p.trips.len(), 1);
        assert_eq!(p.next_departure(), Some(SimTime(500)));
    }

    #[test]
    fn retain_pending_keeps_current_index() {
        let mut p = passenger(0, vec![trip(100, &[0, 1]), trip(200, &[1, 2]), trip(300, &[2, 0])]);
        p.begin_next_trip();
        p.finish_current(SimTime(150));
        p.begin_next_trip(); // trip at 200 is now current
        let dropped = p.retain_pending(|_| false);
        assert_eq!(dropped, 1);
        assert_eq!(p.trips.len(), 2);
        assert_eq!(p.current_trip().unwrap().departure, SimTime(200));

        let mut q = passenger(1, vec![trip(100, &[0, 1]), trip(300, &[1, 2]), trip(200, &[2, 0])]);
        q.begin_next_trip(); // 100
        q.finish_current(SimTime(110));
        // Current becomes the 200 trip at index 2; dropping index 1 shifts it.
        q.begin_next_trip();
        assert_eq!(q.retain_pending(|t| t.departure != SimTime(300)), 1);
        assert_eq!(q.current_trip().unwrap().departure, SimTime(200));
    }

    #[test]
    fn remaining_from() {
        let t = super::helpers::trip(0, &[0, 1, 2]);
        assert_eq!(t.remaining_from(StationId(0)), 3);
        assert_eq!(t.remaining_from(StationId(2)), 1);
        assert_eq!(t.remaining_from(StationId(9)), 0);
    }
}

// ── Sorted outside index ──────────────────────────────────────────────────────

#[cfg(test)]
mod sorted_index {
    use metro_core::{PassengerId, SimTime};
    use proptest::prelude::*;

    use super::helpers::{passenger, trip};
    use crate::PopulationStore;

    #[test]
    fn pops_strictly_before_in_order() {
        let mut store = PopulationStore::new(3, 0);
        store.insert_outside(passenger(0, vec![trip(300, &[0, 1])]));
        store.insert_outside(passenger(1, vec![trip(100, &[0, 1])]));
        store.insert_outside(passenger(2, vec![]));
        store.insert_outside(passenger(3, vec![trip(200, &[0, 1])]));

        let popped = store.pop_all_before(SimTime(300));
        let ids: Vec<u64> = popped.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.outside().len(), 2);
        assert!(store.outside_index_is_consistent());

        // A passenger without a next trip is never popped.
        assert_eq!(store.pop_all_before(SimTime(i64::MAX)).len(), 1);
        assert_eq!(store.outside_departures(), vec![(SimTime(i64::MAX), PassengerId(2))]);
    }

    #[test]
    fn allocate_id_skips_existing() {
        let mut store = PopulationStore::new(1, 0);
        store.insert_outside(passenger(41, vec![]));
        assert_eq!(store.allocate_id(), PassengerId(42));
        assert_eq!(store.allocate_id(), PassengerId(43));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let ps = vec![passenger(0, vec![]), passenger(0, vec![])];
        assert!(PopulationStore::with_passengers(1, 0, ps).is_err());
    }

    proptest! {
        #[test]
        fn stays_sorted_under_insert_and_pop(
            departures in prop::collection::vec(prop::option::of(0i64..1_000), 0..60),
            cuts in prop::collection::vec(0i64..1_100, 1..8),
        ) {
            let mut store = PopulationStore::new(3, 0);
            for (i, dep) in departures.iter().enumerate() {
                let trips = dep.map(|d| vec![trip(d, &[0, 1])]).unwrap_or_default();
                store.insert_outside(passenger(i as u64, trips));
            }
            prop_assert!(store.outside_index_is_consistent());

            let mut reinserted = departures.len() as u64;
            for cut in cuts {
                let before = store.outside().len();
                let popped = store.pop_all_before(SimTime(cut));
                prop_assert!(popped.iter().all(|p| p.next_departure().is_some_and(|d| d < SimTime(cut))));
                prop_assert!(popped.windows(2).all(|w| w[0].next_departure() <= w[1].next_departure()));
                prop_assert!(store.outside().values().all(|p| p.next_departure().is_none_or(|d| d >= SimTime(cut))));
                prop_assert_eq!(store.outside().len() + popped.len(), before);

                // Put half of them back with a later departure.
                for p in popped.into_iter().step_by(2) {
                    let later = p.next_departure().map_or(0, |d| d.0) + 500;
                    store.insert_outside(passenger(reinserted, vec![trip(later, &[0, 1])]));
                    reinserted += 1;
                }
                prop_assert!(store.outside_index_is_consistent());
            }
        }
    }
}

// ── Pool transfers ────────────────────────────────────────────────────────────

#[cfg(test)]
mod transfers {
    use metro_core::{LineId, PassengerId, SimTime, StationId, TrainId};

    use super::helpers::{network, passenger, trip};
    use crate::{Location, PopulationStore};

    #[test]
    fn depart_enters_origin_station() {
        let net = network();
        let mut store = PopulationStore::new(3, 1);
        store.insert_outside(passenger(0, vec![trip(100, &[0, 1, 2])]));
        store.insert_outside(passenger(1, vec![trip(900, &[1, 2])]));

        let stats = store.depart_before(SimTime(0), SimTime(500), &net);
        assert_eq!(stats.entered, 1);
        assert_eq!(store.location_of(PassengerId(0)), Some(Location::Station(StationId(0))));
        assert_eq!(store.location_of(PassengerId(1)), Some(Location::Outside));
        assert_eq!(store.transfer_count(), 1);
        store.check_exclusive().unwrap();
    }

    #[test]
    fn closed_origin_drops_trip() {
        let mut net = network();
        net.close_station(StationId(0));
        let mut store = PopulationStore::new(3, 1);
        store.insert_outside(passenger(0, vec![trip(100, &[0, 1]), trip(800, &[1, 2])]));

        let stats = store.depart_before(SimTime(0), SimTime(500), &net);
        assert_eq!(stats, crate::DepartStats { entered: 0, dropped: 1 });
        let p = &store.outside()[&PassengerId(0)];
        assert_eq!(p.trips.len(), 1);
        assert_eq!(p.next_departure(), Some(SimTime(800)));
        assert!(store.outside_index_is_consistent());
    }

    #[test]
    fn closed_station_on_path_drops_trip() {
        let mut net = network();
        net.close_station(StationId(1));
        let mut store = PopulationStore::new(3, 1);
        store.insert_outside(passenger(0, vec![trip(100, &[0, 1, 2])]));
        store.insert_outside(passenger(1, vec![trip(100, &[2, 1])]));

        let stats = store.depart_before(SimTime(0), SimTime(500), &net);
        assert_eq!(stats, crate::DepartStats { entered: 0, dropped: 2 });
        assert!(store.outside().values().all(|p| p.trips.is_empty()));
        assert_eq!(store.total(), 2);
    }

    #[test]
    fn closed_hop_on_path_drops_trip() {
        let mut net = network();
        net.close_span(LineId(0), StationId(1), StationId(2)).unwrap();
        let mut store = PopulationStore::new(3, 1);
        store.insert_outside(passenger(0, vec![trip(100, &[0, 1, 2])]));
        store.insert_outside(passenger(1, vec![trip(100, &[0, 1])]));

        let stats = store.depart_before(SimTime(0), SimTime(500), &net);
        assert_eq!(stats, crate::DepartStats { entered: 1, dropped: 1 });
        assert_eq!(store.location_of(PassengerId(0)), Some(Location::Outside));
        assert_eq!(store.location_of(PassengerId(1)), Some(Location::Station(StationId(0))));
    }

    #[test]
    fn late_entry_is_stamped_at_tick_start() {
        let net = network();
        let mut store = PopulationStore::new(3, 1);
        store.insert_outside(passenger(0, vec![trip(100, &[0, 1])]));
        store.insert_outside(passenger(1, vec![trip(1_500, &[0, 2])]));

        store.depart_before(SimTime(1_000), SimTime(2_000), &net);
        let waiting = store.stations().lock(StationId(0));
        assert_eq!(waiting[&PassengerId(0)].last_station_arrival, SimTime(1_000));
        assert_eq!(waiting[&PassengerId(1)].last_station_arrival, SimTime(1_500));
        drop(waiting);

        // A short wait after the tick start does not time out the stale departure.
        let stats = store.flush_stations(SimTime(1_500), 900);
        assert_eq!(stats.timed_out, 0);
    }

    #[test]
    fn flush_arrivals_and_timeouts() {
        let net = network();
        let mut store = PopulationStore::new(3, 1);
        store.insert_outside(passenger(0, vec![trip(100, &[1, 2])]));
        store.insert_outside(passenger(1, vec![trip(100, &[0, 2])]));
        store.depart_before(SimTime(0), SimTime(101), &net);

        // Passenger 0 reaches its destination at t = 400.
        let mut p = store.stations_mut().get_mut(StationId(1)).remove(&PassengerId(0)).unwrap();
        p.last_station_arrival = SimTime(400);
        store.stations_mut().get_mut(StationId(2)).insert(p.id, p);

        let stats = store.flush_stations(SimTime(2_000), 1_000);
        assert_eq!(stats.arrived, 1);
        assert_eq!(stats.timed_out, 1);

        let done = &store.outside()[&PassengerId(0)];
        assert_eq!(done.trips[0].arrival, Some(SimTime(400)));
        assert!(!done.trips[0].abandoned);
        let gave_up = &store.outside()[&PassengerId(1)];
        assert_eq!(gave_up.trips[0].arrival, Some(SimTime(2_000)));
        assert!(gave_up.trips[0].abandoned);
        assert_eq!(store.total(), 2);
    }

    #[test]
    fn exchange_alights_and_boards() {
        let net = network();
        let mut store = PopulationStore::new(3, 1);
        // 0 and 1 start at station 0 going up, 2 goes the other way.
        store.insert_outside(passenger(0, vec![trip(10, &[0, 1])]));
        store.insert_outside(passenger(1, vec![trip(10, &[0, 1, 2])]));
        store.insert_outside(passenger(2, vec![trip(10, &[1, 0])]));
        store.depart_before(SimTime(0), SimTime(11), &net);

        let up = (StationId(1), LineId(0));
        let ex = store.exchange(StationId(0), TrainId(0), up, 10, SimTime(60));
        assert_eq!(ex.boarded, 2);
        assert_eq!(ex.alighted, 0);
        assert_eq!(store.location_of(PassengerId(2)), Some(Location::Station(StationId(1))));

        // At station 1, passenger 0 alights; 1 continues to 2.
        let ex = store.exchange(StationId(1), TrainId(0), (StationId(2), LineId(0)), 10, SimTime(200));
        assert_eq!(ex.alighted, 1);
        assert_eq!(ex.boarded, 0);
        assert_eq!(store.location_of(PassengerId(0)), Some(Location::Station(StationId(1))));
        assert_eq!(store.location_of(PassengerId(1)), Some(Location::Train(TrainId(0))));
        assert_eq!(store.stations().lock(StationId(1))[&PassengerId(0)].last_station_arrival, SimTime(200));
        store.check_exclusive().unwrap();
        assert_eq!(store.total(), 3);
    }

    #[test]
    fn boarding_respects_capacity() {
        let net = network();
        let mut store = PopulationStore::new(3, 1);
        for i in 0..5 {
            store.insert_outside(passenger(i, vec![trip(10, &[0, 2])]));
        }
        store.depart_before(SimTime(0), SimTime(11), &net);
        let ex = store.exchange(StationId(0), TrainId(0), (StationId(1), LineId(0)), 3, SimTime(60));
        assert_eq!(ex.boarded, 3);
        assert_eq!(store.trains().lock(TrainId(0)).len(), 3);
        assert_eq!(store.stations().lock(StationId(0)).len(), 2);
        // Lowest ids board first.
        assert!(store.trains().lock(TrainId(0)).contains_key(&PassengerId(0)));
    }

    #[test]
    fn transfer_log_is_drained() {
        let net = network();
        let mut store = PopulationStore::new(3, 1);
        store.insert_outside(passenger(0, vec![trip(10, &[0, 1])]));
        store.depart_before(SimTime(0), SimTime(11), &net);
        let log = store.take_transfers();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].from, Location::Outside);
        assert_eq!(log[0].to, Location::Station(StationId(0)));
        assert_eq!(store.transfer_count(), 0);
    }
}

// ── Generation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod generator {
    use chrono::NaiveDateTime;

    use metro_core::{SimConfig, SimRng, StationId, TimeWindow, TripPattern, TripPatternProportions};

    use super::helpers::network;
    use crate::{PopulationError, generate_population};

    fn config(size: usize) -> SimConfig {
        let start: NaiveDateTime = "2024-03-04T05:00:00".parse().unwrap();
        let end: NaiveDateTime = "2024-03-04T23:00:00".parse().unwrap();
        let mut cfg = SimConfig::new(11, start, end);
        cfg.population.size = size;
        cfg
    }

    #[test]
    fn generates_valid_trips_inside_business_day() {
        let net = network();
        let cfg = config(200);
        let ps = generate_population(&net, &cfg, &mut SimRng::new(cfg.seed)).unwrap();
        assert_eq!(ps.len(), 200);

        let window = cfg.business_day.window_on(cfg.start_time());
        for (i, p) in ps.iter().enumerate() {
            assert_eq!(p.id.0, i as u64);
            assert!(!p.trips.is_empty() && p.trips.len() <= 3);
            for t in &p.trips {
                assert!(t.path.len() >= 2 && t.path.is_valid());
                assert!(window.contains(t.departure));
            }
            assert!(p.trips.windows(2).all(|w| w[0].departure <= w[1].departure));
            assert!(p.trips.windows(2).all(|w| w[0].destination() == w[1].origin()));
        }
    }

    #[test]
    fn departures_stay_inside_the_run() {
        let net = network();
        let mut cfg = config(200);
        cfg.start = "2024-03-04T08:00:00".parse().unwrap();
        cfg.end = "2024-03-04T10:00:00".parse().unwrap();
        let ps = generate_population(&net, &cfg, &mut SimRng::new(cfg.seed)).unwrap();
        let run = TimeWindow::new(cfg.start_time(), cfg.end_time());
        assert!(ps.iter().flat_map(|p| &p.trips).all(|t| run.contains(t.departure)));
    }

    #[test]
    fn run_outside_business_day_uses_run_window() {
        let net = network();
        let mut cfg = config(50);
        cfg.start = "2024-03-04T01:00:00".parse().unwrap();
        cfg.end = "2024-03-04T03:00:00".parse().unwrap();
        let ps = generate_population(&net, &cfg, &mut SimRng::new(2)).unwrap();
        let run = TimeWindow::new(cfg.start_time(), cfg.end_time());
        assert!(ps.iter().flat_map(|p| &p.trips).all(|t| run.contains(t.departure)));
    }

    #[test]
    fn round_trips_come_back() {
        let net = network();
        let mut cfg = config(50);
        cfg.population.trip_patterns = TripPatternProportions { one_way: 0.0, round_trip: 1.0, chain: 0.0 };
        let ps = generate_population(&net, &cfg, &mut SimRng::new(3)).unwrap();
        for p in &ps {
            assert_eq!(p.trips.len(), TripPattern::RoundTrip.trip_count());
            assert_eq!(p.trips[0].origin(), p.trips[1].destination());
        }
    }

    #[test]
    fn same_seed_same_population() {
        let net = network();
        let cfg = config(30);
        let a = generate_population(&net, &cfg, &mut SimRng::new(5)).unwrap();
        let b = generate_population(&net, &cfg, &mut SimRng::new(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn disconnected_network_is_an_error() {
        let mut net = network();
        for s in 0..3 {
            net.close_station(StationId(s));
        }
        net.rebuild_graph().unwrap();
        let err = generate_population(&net, &config(5), &mut SimRng::new(1)).unwrap_err();
        assert!(matches!(err, PopulationError::Config(_)));
        assert!(generate_population(&net, &config(0), &mut SimRng::new(1)).unwrap().is_empty());
    }
}
