//! `PopulationStore` — the three disjoint passenger pools.
//!
//! ```text
//!   outside ──depart──▶ in_station[s] ──board──▶ in_train[t]
//!      ▲                   │  ▲                     │
//!      └──────flush────────┘  └───────alight────────┘
//! ```
//!
//! A passenger is in exactly one pool at any time.  Every move between pools
//! is a remove followed by an insert under the locks of both pools involved,
//! and is appended to the transfer log.
//!
//! # Sorted index
//!
//! `outside_sorted` holds `(next departure, id)` for every outside passenger
//! in **descending** order, passengers without a next trip first (their key
//! is `SimTime(i64::MAX)`).  Popping everything departing before `t` is a
//! binary search plus a `split_off` of the tail, O(log n + k); insertion is a
//! binary search plus a shift.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use metro_core::{LineId, PassengerId, SimTime, StationId, TrainId};
use metro_network::Network;

use crate::{Passenger, PassengerMap, PopulationError, PopulationResult, StationPools, TrainPools, pool::Pools};

// ── Transfer log ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    Outside,
    Station(StationId),
    Train(TrainId),
}

/// One move between pools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub passenger: PassengerId,
    pub from:      Location,
    pub to:        Location,
    pub at:        SimTime,
}

// ── Per-phase results ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DepartStats {
    /// Passengers who entered their origin station.
    pub entered: usize,
    /// Trips dropped because their path was closed or too short.
    pub dropped: usize,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub arrived:   usize,
    pub timed_out: usize,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Exchange {
    pub alighted: usize,
    pub boarded:  usize,
}

// ── PopulationStore ───────────────────────────────────────────────────────────

pub struct PopulationStore {
    outside:        PassengerMap,
    outside_sorted: Vec<(SimTime, PassengerId)>,
    stations:       StationPools,
    trains:         TrainPools,
    transfers:      Mutex<Vec<Transfer>>,
    next_id:        u64,
}

#[inline]
fn sort_key(p: &Passenger) -> (SimTime, PassengerId) {
    (p.next_departure().unwrap_or(SimTime(i64::MAX)), p.id)
}

impl PopulationStore {
    pub fn new(station_count: usize, train_count: usize) -> Self {
        Self {
            outside:        PassengerMap::default(),
            outside_sorted: Vec::new(),
            stations:       StationPools(Pools::new(station_count)),
            trains:         TrainPools(Pools::new(train_count)),
            transfers:      Mutex::new(Vec::new()),
            next_id:        0,
        }
    }

    /// A store with every passenger outside.
    ///
    /// # Errors
    ///
    /// [`PopulationError::Config`] on a duplicate passenger id.
    pub fn with_passengers(
        station_count: usize,
        train_count:   usize,
        passengers:    Vec<Passenger>,
    ) -> PopulationResult<Self> {
        let mut store = Self::new(station_count, train_count);
        for p in passengers {
            if store.outside.contains_key(&p.id) {
                return Err(PopulationError::Config(format!("{} appears twice", p.id)));
            }
            store.insert_outside(p);
        }
        Ok(store)
    }

    /// A fresh id, never used by any passenger in the store.
    pub fn allocate_id(&mut self) -> PassengerId {
        let id = PassengerId(self.next_id);
        self.next_id += 1;
        id
    }

    // ── Pool access ───────────────────────────────────────────────────────

    #[inline]
    pub fn outside(&self) -> &PassengerMap {
        &self.outside
    }

    #[inline]
    pub fn stations(&self) -> &StationPools {
        &self.stations
    }

    #[inline]
    pub fn stations_mut(&mut self) -> &mut StationPools {
        &mut self.stations
    }

    #[inline]
    pub fn trains(&self) -> &TrainPools {
        &self.trains
    }

    #[inline]
    pub fn trains_mut(&mut self) -> &mut TrainPools {
        &mut self.trains
    }

    /// Passengers in all three pools.
    pub fn total(&self) -> usize {
        self.outside.len() + self.stations.total() + self.trains.total()
    }

    /// The pool currently holding `id`.
    pub fn location_of(&self, id: PassengerId) -> Option<Location> {
        if self.outside.contains_key(&id) {
            return Some(Location::Outside);
        }
        if let Some(s) = self.stations.0.find(id) {
            return Some(Location::Station(StationId(s as u32)));
        }
        self.trains.0.find(id).map(|t| Location::Train(TrainId(t as u32)))
    }

    /// Clones of every passenger, ascending by id.
    pub fn snapshot(&self) -> Vec<Passenger> {
        let mut all: Vec<Passenger> = self.outside.values().cloned().collect();
        for i in 0..self.stations.0.len() {
            all.extend(self.stations.0.lock(i).values().cloned());
        }
        for i in 0..self.trains.0.len() {
            all.extend(self.trains.0.lock(i).values().cloned());
        }
        all.sort_by_key(|p| p.id);
        all
    }

    // ── Outside pool and sorted index ─────────────────────────────────────

    /// Insert `p` outside, keeping the index sorted.
    pub fn insert_outside(&mut self, p: Passenger) {
        self.next_id = self.next_id.max(p.id.0 + 1);
        let key = sort_key(&p);
        // Descending: the first position whose key is below ours.
        let at = self.outside_sorted.partition_point(|k| *k > key);
        self.outside_sorted.insert(at, key);
        self.outside.insert(p.id, p);
    }

    /// Remove and return every outside passenger whose next trip departs
    /// strictly before `t`, earliest first.
    pub fn pop_all_before(&mut self, t: SimTime) -> Vec<Passenger> {
        let cut = self.outside_sorted.partition_point(|(dep, _)| *dep >= t);
        let popped = self.outside_sorted.split_off(cut);
        popped
            .into_iter()
            .rev()
            .filter_map(|(_, id)| self.outside.remove(&id))
            .collect()
    }

    /// Departure keys of the outside index, ascending (earliest first).
    pub fn outside_departures(&self) -> Vec<(SimTime, PassengerId)> {
        self.outside_sorted.iter().rev().copied().collect()
    }

    /// `true` if the index matches the outside pool and is ordered.
    pub fn outside_index_is_consistent(&self) -> bool {
        self.outside_sorted.len() == self.outside.len()
            && self.outside_sorted.windows(2).all(|w| w[0] > w[1])
            && self
                .outside_sorted
                .iter()
                .all(|(k, id)| self.outside.get(id).is_some_and(|p| sort_key(p) == (*k, *id)))
    }

    /// Edit outside passengers in place, then rebuild the index.
    pub fn edit_outside<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Passenger),
    {
        for p in self.outside.values_mut() {
            f(p);
        }
        self.resort_outside();
    }

    fn resort_outside(&mut self) {
        self.outside_sorted = self.outside.values().map(sort_key).collect();
        self.outside_sorted.sort_unstable_by(|a, b| b.cmp(a));
    }

    // ── Moves between pools ───────────────────────────────────────────────

    fn log(&self, passenger: PassengerId, from: Location, to: Location, at: SimTime) {
        self.transfers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Transfer { passenger, from, to, at });
    }

    /// Put `p` in the waiting pool of `station`.
    pub fn enter_station(&self, p: Passenger, station: StationId, at: SimTime) {
        self.log(p.id, Location::Outside, Location::Station(station), at);
        self.stations.lock(station).insert(p.id, p);
    }

    /// Put `p`, already removed from `from`, back outside.
    pub fn move_outside(&mut self, p: Passenger, from: Location, at: SimTime) {
        self.log(p.id, from, Location::Outside, at);
        self.insert_outside(p);
    }

    /// Remove every passenger waiting at `station`.
    pub fn drain_station(&mut self, station: StationId) -> Vec<Passenger> {
        let mut out: Vec<Passenger> = self.stations.get_mut(station).drain().map(|(_, p)| p).collect();
        out.sort_by_key(|p| p.id);
        out
    }

    /// Start the next trip of every passenger departing in `[from, t)`.
    ///
    /// The station arrival is stamped no earlier than `from`, so a departure
    /// left over from before the tick does not count as time already waited.
    /// A trip whose path has fewer than two stations, or crosses a closed
    /// station or hop, is dropped and the passenger goes back outside.
    pub fn depart_before(&mut self, from: SimTime, t: SimTime, network: &Network) -> DepartStats {
        let mut stats = DepartStats::default();
        for mut p in self.pop_all_before(t) {
            let origin = p.begin_next_trip();
            let usable = p
                .current_trip()
                .is_some_and(|trip| trip.path.len() >= 2 && network.is_path_open(&trip.path));
            match origin {
                Some(station) if usable => {
                    p.last_station_arrival = p.last_station_arrival.max(from);
                    let at = p.last_station_arrival;
                    self.enter_station(p, station, at);
                    stats.entered += 1;
                }
                _ => {
                    debug!(passenger = %p.id, "trip dropped at departure");
                    p.drop_current();
                    self.insert_outside(p);
                    stats.dropped += 1;
                }
            }
        }
        stats
    }

    /// Send home everyone who has reached their destination or waited too long.
    ///
    /// Arrivals are stamped with the time the passenger reached the station;
    /// timeouts are stamped `now` and marked abandoned.
    pub fn flush_stations(&mut self, now: SimTime, max_wait_secs: i64) -> FlushStats {
        let mut stats = FlushStats::default();
        let mut flushed: Vec<(Passenger, StationId)> = Vec::new();

        for (i, map) in self.stations.0.maps_mut().enumerate() {
            let station = StationId(i as u32);
            let mut leaving: Vec<PassengerId> = map
                .values()
                .filter(|p| p.destination() == Some(station) || now - p.last_station_arrival > max_wait_secs)
                .map(|p| p.id)
                .collect();
            leaving.sort_unstable();
            for id in leaving {
                let Some(mut p) = map.remove(&id) else { continue };
                if p.destination() == Some(station) {
                    let at = p.last_station_arrival;
                    p.finish_current(at);
                    stats.arrived += 1;
                } else {
                    p.abandon_current(now);
                    stats.timed_out += 1;
                }
                flushed.push((p, station));
            }
        }

        for (p, station) in flushed {
            self.move_outside(p, Location::Station(station), now);
        }
        stats
    }

    /// Alight and board at `station` for `train`.
    ///
    /// `continuing` is the train's next stop and line.  A rider stays aboard
    /// iff their path continues from `station` to that stop on that line; a
    /// waiting passenger boards under the same condition while seats remain.
    /// Boarding goes by ascending passenger id.
    pub fn exchange(
        &self,
        station:    StationId,
        train:      TrainId,
        continuing: (StationId, LineId),
        capacity:   u32,
        now:        SimTime,
    ) -> Exchange {
        let stays = |p: &Passenger| {
            p.current_trip().and_then(|t| t.path.next_after(station)) == Some(continuing)
        };

        let mut waiting = self.stations.lock(station);
        let mut riding = self.trains.lock(train);
        let mut moves = Vec::new();

        let mut alighting: Vec<PassengerId> = riding.values().filter(|&p| !stays(p)).map(|p| p.id).collect();
        alighting.sort_unstable();
        for id in &alighting {
            if let Some(mut p) = riding.remove(id) {
                p.last_station_arrival = now;
                waiting.insert(p.id, p);
                moves.push((*id, Location::Train(train), Location::Station(station)));
            }
        }

        let room = (capacity as usize).saturating_sub(riding.len());
        let mut boarding: Vec<PassengerId> = waiting.values().filter(|&p| stays(p)).map(|p| p.id).collect();
        boarding.sort_unstable();
        boarding.truncate(room);
        for id in &boarding {
            if let Some(p) = waiting.remove(id) {
                riding.insert(p.id, p);
                moves.push((*id, Location::Station(station), Location::Train(train)));
            }
        }
        drop(riding);
        drop(waiting);

        let mut log = self.transfers.lock().unwrap_or_else(PoisonError::into_inner);
        log.extend(moves.into_iter().map(|(passenger, from, to)| Transfer { passenger, from, to, at: now }));

        Exchange { alighted: alighting.len(), boarded: boarding.len() }
    }

    /// Check that no passenger sits in two pools.
    pub fn check_exclusive(&self) -> PopulationResult<()> {
        let mut seen = std::collections::HashSet::new();
        let snapshot = self.snapshot();
        for p in &snapshot {
            if !seen.insert(p.id) {
                return Err(PopulationError::Misplaced(p.id));
            }
        }
        Ok(())
    }

    // ── Transfer log ──────────────────────────────────────────────────────

    pub fn transfer_count(&self) -> usize {
        self.transfers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Take the log accumulated so far, leaving it empty.
    pub fn take_transfers(&mut self) -> Vec<Transfer> {
        std::mem::take(self.transfers.get_mut().unwrap_or_else(PoisonError::into_inner))
    }
}
