//! Passengers and their trips.

use metro_core::{PassengerId, PassengerKind, SimTime, StationId};
use metro_network::Path;

// ── Trip ──────────────────────────────────────────────────────────────────────

/// One journey through the network.
///
/// `arrival` is stamped once, when the passenger leaves the network; the
/// trip is immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    pub departure: SimTime,
    pub arrival:   Option<SimTime>,
    pub path:      Path,
    /// The passenger gave up: maximum wait exceeded or no route left.
    pub abandoned: bool,
}

impl Trip {
    pub fn new(departure: SimTime, path: Path) -> Self {
        Self { departure, arrival: None, path, abandoned: false }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.arrival.is_some()
    }

    #[inline]
    pub fn origin(&self) -> Option<StationId> {
        self.path.head()
    }

    #[inline]
    pub fn destination(&self) -> Option<StationId> {
        self.path.tail()
    }

    /// Stations still ahead of `station`, counting it.
    pub fn remaining_from(&self, station: StationId) -> usize {
        self.path.position(station).map_or(0, |i| self.path.len() - i)
    }
}

// ── Passenger ─────────────────────────────────────────────────────────────────

/// A traveller with a day's worth of trips.
///
/// `current` indexes the trip in progress.  `next` caches the earliest
/// incomplete trip other than the current one, by departure time; call
/// [`refresh_next`](Self::refresh_next) after editing trips directly.
#[derive(Clone, Debug, PartialEq)]
pub struct Passenger {
    pub id:                   PassengerId,
    pub kind:                 PassengerKind,
    pub trips:                Vec<Trip>,
    current:                  Option<usize>,
    next:                     Option<usize>,
    /// When the passenger last arrived at a station (entered it or alighted).
    pub last_station_arrival: SimTime,
}

impl Passenger {
    pub fn new(id: PassengerId, kind: PassengerKind, trips: Vec<Trip>) -> Self {
        let mut p = Self {
            id,
            kind,
            trips,
            current: None,
            next: None,
            last_station_arrival: SimTime::ZERO,
        };
        p.refresh_next();
        p
    }

    // ── Trip access ───────────────────────────────────────────────────────

    #[inline]
    pub fn current_trip(&self) -> Option<&Trip> {
        self.current.map(|i| &self.trips[i])
    }

    #[inline]
    pub fn current_trip_mut(&mut self) -> Option<&mut Trip> {
        self.current.map(|i| &mut self.trips[i])
    }

    /// Index of the trip in progress within `trips`.
    #[inline]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    #[inline]
    pub fn next_trip(&self) -> Option<&Trip> {
        self.next.map(|i| &self.trips[i])
    }

    /// Departure of the cached next trip; `None` sorts after every time.
    #[inline]
    pub fn next_departure(&self) -> Option<SimTime> {
        self.next_trip().map(|t| t.departure)
    }

    #[inline]
    pub fn is_travelling(&self) -> bool {
        self.current.is_some()
    }

    /// Where the current trip ends.
    pub fn destination(&self) -> Option<StationId> {
        self.current_trip().and_then(Trip::destination)
    }

    /// Recompute the cached next trip.
    pub fn refresh_next(&mut self) {
        let current = self.current;
        self.next = self
            .trips
            .iter()
            .enumerate()
            .filter(|&(i, t)| Some(i) != current && !t.is_complete())
            .min_by_key(|&(i, t)| (t.departure, i))
            .map(|(i, _)| i);
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Make the cached next trip current.  Returns its origin.
    ///
    /// The passenger is considered to reach the origin at the trip's
    /// departure time.
    pub fn begin_next_trip(&mut self) -> Option<StationId> {
        let i = self.next?;
        self.current = Some(i);
        self.last_station_arrival = self.trips[i].departure;
        self.refresh_next();
        self.trips[i].origin()
    }

    /// Stamp the current trip's arrival and leave the network.
    pub fn finish_current(&mut self, at: SimTime) {
        if let Some(i) = self.current.take() {
            self.trips[i].arrival = Some(at);
        }
        self.refresh_next();
    }

    /// Like [`finish_current`](Self::finish_current), marking the trip abandoned.
    pub fn abandon_current(&mut self, at: SimTime) {
        if let Some(i) = self.current {
            self.trips[i].abandoned = true;
        }
        self.finish_current(at);
    }

    /// Remove the current trip entirely (it never happened).
    pub fn drop_current(&mut self) {
        if let Some(i) = self.current.take() {
            self.trips.remove(i);
        }
        self.refresh_next();
    }

    /// Add a trip and refresh the cache.
    pub fn push_trip(&mut self, trip: Trip) {
        self.trips.push(trip);
        self.refresh_next();
    }

    /// Keep only the pending trips (incomplete, not current) for which `keep`
    /// returns `true`; `keep` may also edit them.  Returns how many were
    /// dropped.
    pub fn retain_pending<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&mut Trip) -> bool,
    {
        let before = self.trips.len();
        let current = self.current;
        let mut idx = 0;
        let mut removed_ahead = 0;
        self.trips.retain_mut(|t| {
            let i = idx;
            idx += 1;
            let kept = Some(i) == current || t.is_complete() || keep(t);
            if !kept && current.is_some_and(|c| i < c) {
                removed_ahead += 1;
            }
            kept
        });
        self.current = current.map(|c| c - removed_ahead);
        self.refresh_next();
        before - self.trips.len()
    }
}
