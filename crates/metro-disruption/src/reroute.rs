//! Passenger rerouting after a closure starts.
//!
//! Runs after the graph has been rebuilt, in four passes:
//!
//! | Pass | Who                                   | Outcome                                  |
//! |------|---------------------------------------|------------------------------------------|
//! | a    | outside, trip pending in the window   | new start and path, or trip dropped      |
//! | b    | waiting at the closed station         | evicted, maybe with a walking trip       |
//! | c    | waiting elsewhere, path affected      | new path, truncated path, or flushed     |
//! | d    | aboard a train, path affected         | new path from the train's next open stop |
//!
//! A line closure leaves every station open, so pass b never applies to it.

use tracing::debug;

use metro_core::{LineId, SimTime, StationId, TimeWindow};
use metro_network::{Network, Path};
use metro_population::{Location, Passenger, PopulationStore, Trip};
use metro_timetable::Train;

/// Open stations, nearest first, tried as the start of a walking trip.
const WALK_CANDIDATES: usize = 4;

/// What a closure made unusable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Closure {
    Station(StationId),
    /// Consecutive stations of `line` whose hops are closed.
    Span { line: LineId, stations: Vec<StationId> },
}

impl Closure {
    /// `true` if `path` visits the closed station or rides a closed hop.
    pub fn touches(&self, path: &Path) -> bool {
        match self {
            Closure::Station(s) => path.contains(*s),
            Closure::Span { line, stations } => {
                stations.windows(2).any(|w| path.uses_hop(w[0], w[1], *line))
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RerouteStats {
    /// Paths replaced by one reaching the destination.
    pub rerouted:      usize,
    /// Paths replaced by one stopping short of the destination.
    pub truncated:     usize,
    /// Pending trips removed.
    pub dropped_trips: usize,
    /// Passengers put out of the closed station.
    pub evicted:       usize,
    /// Evicted passengers given a walking trip.
    pub walking:       usize,
    /// Waiting passengers sent outside with nowhere to go.
    pub flushed:       usize,
}

impl std::ops::AddAssign for RerouteStats {
    fn add_assign(&mut self, o: Self) {
        self.rerouted      += o.rerouted;
        self.truncated     += o.truncated;
        self.dropped_trips += o.dropped_trips;
        self.evicted       += o.evicted;
        self.walking       += o.walking;
        self.flushed       += o.flushed;
    }
}

/// Apply all four passes for one closure that started at `now`.
pub fn reroute(
    closure: &Closure,
    window:  TimeWindow,
    now:     SimTime,
    network: &Network,
    trains:  &[Train],
    store:   &mut PopulationStore,
) -> RerouteStats {
    let mut stats = RerouteStats::default();
    reroute_outside(closure, window, network, store, &mut stats);
    if let Closure::Station(station) = closure {
        evict_station(*station, now, network, store, &mut stats);
    }
    reroute_waiting(closure, now, network, store, &mut stats);
    reroute_riding(closure, network, trains, store, &mut stats);
    debug!(?closure, ?stats, "passengers rerouted");
    stats
}

// ── Pass a ────────────────────────────────────────────────────────────────────

fn reroute_outside(
    closure: &Closure,
    window:  TimeWindow,
    network: &Network,
    store:   &mut PopulationStore,
    stats:   &mut RerouteStats,
) {
    store.edit_outside(|p| {
        let dropped = p.retain_pending(|trip| {
            if !window.contains(trip.departure) || !closure.touches(&trip.path) {
                return true;
            }
            match replan_pending(&trip.path, network) {
                Some(path) => {
                    trip.path = path;
                    stats.rerouted += 1;
                    true
                }
                None => false,
            }
        });
        stats.dropped_trips += dropped;
    });
}

/// New path for a trip that has not started yet.
///
/// A closed origin moves the start to the second station of the old path if
/// that one is open, else to the open station nearest the origin.
fn replan_pending(path: &Path, network: &Network) -> Option<Path> {
    let origin = path.head()?;
    let dest = path.tail()?;
    if !network.is_open(dest) {
        return None;
    }
    let start = if network.is_open(origin) {
        origin
    } else {
        match path.stations().get(1) {
            Some(&second) if network.is_open(second) => second,
            _ => network.nearest_open_station(origin)?,
        }
    };
    let route = network.route(start, dest)?;
    (route.path.len() >= 2).then_some(route.path)
}

// ── Pass b ────────────────────────────────────────────────────────────────────

fn evict_station(
    station: StationId,
    now:     SimTime,
    network: &Network,
    store:   &mut PopulationStore,
    stats:   &mut RerouteStats,
) {
    for mut p in store.drain_station(station) {
        let dest = p.destination();
        if dest == Some(station) {
            let at = p.last_station_arrival;
            p.finish_current(at);
        } else {
            let remaining = p.current_trip().map_or(0, |t| t.remaining_from(station));
            p.abandon_current(now);
            let walk = dest
                .filter(|_| remaining > 2)
                .and_then(|d| walking_trip(station, d, now, network));
            if let Some(trip) = walk {
                p.push_trip(trip);
                stats.walking += 1;
            }
        }
        stats.evicted += 1;
        store.move_outside(p, Location::Station(station), now);
    }
}

/// Walk from `closed` to a nearby open station that still reaches `dest`,
/// and ride from there.
fn walking_trip(closed: StationId, dest: StationId, now: SimTime, network: &Network) -> Option<Trip> {
    let here = network.station(closed).position;
    network
        .open_stations_near(here)
        .filter(|&s| s != closed && s != dest)
        .take(WALK_CANDIDATES)
        .find_map(|s| {
            let route = network.lookup(s, dest)?;
            let walk = here.walking_secs(network.station(s).position);
            Some(Trip::new(now + walk, route.path))
        })
}

// ── Pass c ────────────────────────────────────────────────────────────────────

fn reroute_waiting(
    closure: &Closure,
    now:     SimTime,
    network: &Network,
    store:   &mut PopulationStore,
    stats:   &mut RerouteStats,
) {
    let mut flushed: Vec<(Passenger, StationId)> = Vec::new();

    for s in network.stations().iter().map(|s| s.id) {
        if *closure == Closure::Station(s) {
            continue;
        }
        let open = network.is_open(s);
        let waiting = store.stations_mut().get_mut(s);
        let mut give_up = Vec::new();

        for p in waiting.values_mut() {
            let Some(trip) = p.current_trip_mut() else { continue };
            let Some(rest) = trip.path.from_station(s) else { continue };
            if !closure.touches(&rest) {
                continue;
            }
            let route = trip
                .destination()
                .filter(|_| open)
                .and_then(|dest| network.route(s, dest))
                .filter(|r| r.path.len() >= 2);
            match route {
                Some(r) => {
                    if r.reaches_destination {
                        stats.rerouted += 1;
                    } else {
                        stats.truncated += 1;
                    }
                    trip.path = r.path;
                }
                None => give_up.push(p.id),
            }
        }

        give_up.sort_unstable();
        for id in give_up {
            if let Some(mut p) = waiting.remove(&id) {
                p.abandon_current(now);
                flushed.push((p, s));
            }
        }
    }

    stats.flushed += flushed.len();
    for (p, s) in flushed {
        store.move_outside(p, Location::Station(s), now);
    }
}

// ── Pass d ────────────────────────────────────────────────────────────────────

fn reroute_riding(
    closure: &Closure,
    network: &Network,
    trains:  &[Train],
    store:   &mut PopulationStore,
    stats:   &mut RerouteStats,
) {
    for train in trains {
        let line = network.line(train.line);
        let riders = store.trains_mut().get_mut(train.id);
        if riders.is_empty() {
            continue;
        }
        let stop = train.next_open_station(line, network);

        for p in riders.values_mut() {
            let Some(trip) = p.current_trip_mut() else { continue };
            let affected = match trip.path.from_station(train.current) {
                Some(rest) => closure.touches(&rest),
                None => closure.touches(&trip.path),
            };
            if !affected {
                continue;
            }
            let Some(stop) = stop else { continue };

            let dest = trip.destination();
            let onward = dest
                .filter(|&d| d != stop && network.is_open(d))
                .and_then(|d| network.route(stop, d))
                .filter(|r| r.path.len() >= 2);
            match onward {
                _ if dest == Some(stop) => {
                    stats.rerouted += 1;
                    trip.path = Path::single(stop);
                }
                Some(r) => {
                    if r.reaches_destination {
                        stats.rerouted += 1;
                    } else {
                        stats.truncated += 1;
                    }
                    trip.path = r.path;
                }
                None => {
                    // Ride to the next open stop and finish there.
                    stats.truncated += 1;
                    trip.path = Path::single(stop);
                }
            }
        }
    }
}
