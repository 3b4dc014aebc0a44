//! Plain data row types written by output backends.

use metro_core::{SimTime, StationId};
use metro_population::{Location, Passenger, Transfer};
use metro_sim::TickStats;
use metro_timetable::Movement;

/// One train arriving at a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRow {
    pub train:          u32,
    pub line:           u32,
    pub station:        u32,
    pub arrival:        SimTime,
    pub departure:      SimTime,
    pub next_station:   u32,
    pub next_arrival:   SimTime,
    pub next_departure: SimTime,
    pub direction:      &'static str,
    pub revenue:        bool,
    pub trip_number:    u32,
}

impl From<&Movement> for MovementRow {
    fn from(m: &Movement) -> Self {
        Self {
            train:          m.train.0,
            line:           m.line.0,
            station:        m.station.0,
            arrival:        m.arrival,
            departure:      m.departure,
            next_station:   m.next_station.0,
            next_arrival:   m.next_arrival,
            next_departure: m.next_departure,
            direction:      m.direction.as_str(),
            revenue:        m.revenue,
            trip_number:    m.trip_number,
        }
    }
}

/// How a trip stands at the end of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripOutcome {
    Completed,
    Abandoned,
    Ongoing,
    Pending,
}

impl TripOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            TripOutcome::Completed => "completed",
            TripOutcome::Abandoned => "abandoned",
            TripOutcome::Ongoing   => "ongoing",
            TripOutcome::Pending   => "pending",
        }
    }
}

/// One trip of one passenger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRow {
    pub passenger:   u64,
    pub kind:        &'static str,
    /// Index of the trip within the passenger's list.
    pub trip:        u32,
    pub origin:      u32,
    pub destination: u32,
    pub departure:   SimTime,
    /// `None` unless the trip finished (completed or abandoned).
    pub arrival:     Option<SimTime>,
    pub stations:    u32,
    pub transfers:   u32,
    pub outcome:     TripOutcome,
}

impl TripRow {
    /// One row per trip of `p`, in list order.
    pub fn from_passenger(p: &Passenger) -> Vec<TripRow> {
        p.trips
            .iter()
            .enumerate()
            .map(|(i, trip)| {
                let outcome = match (trip.arrival, trip.abandoned) {
                    (Some(_), true)  => TripOutcome::Abandoned,
                    (Some(_), false) => TripOutcome::Completed,
                    (None, _) if p.current_index() == Some(i) => TripOutcome::Ongoing,
                    (None, _) => TripOutcome::Pending,
                };
                TripRow {
                    passenger:   p.id.0,
                    kind:        p.kind.as_str(),
                    trip:        i as u32,
                    origin:      trip.origin().unwrap_or(StationId::INVALID).0,
                    destination: trip.destination().unwrap_or(StationId::INVALID).0,
                    departure:   trip.departure,
                    arrival:     trip.arrival,
                    stations:    trip.path.len() as u32,
                    transfers:   trip.path.transfers() as u32,
                    outcome,
                }
            })
            .collect()
    }
}

/// One passenger moving between pools.
///
/// A pool is written as its kind (`outside`, `station`, `train`) and, for the
/// last two, the station or train id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRow {
    pub passenger: u64,
    pub at:        SimTime,
    pub from:      &'static str,
    pub from_id:   Option<u32>,
    pub to:        &'static str,
    pub to_id:     Option<u32>,
}

fn pool(loc: Location) -> (&'static str, Option<u32>) {
    match loc {
        Location::Outside    => ("outside", None),
        Location::Station(s) => ("station", Some(s.0)),
        Location::Train(t)   => ("train", Some(t.0)),
    }
}

impl From<&Transfer> for TransferRow {
    fn from(t: &Transfer) -> Self {
        let (from, from_id) = pool(t.from);
        let (to, to_id) = pool(t.to);
        Self { passenger: t.passenger.0, at: t.at, from, from_id, to, to_id }
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:      u64,
    pub time:      SimTime,
    pub arrivals:  u64,
    pub entered:   u64,
    pub boarded:   u64,
    pub alighted:  u64,
    pub arrived:   u64,
    pub timed_out: u64,
    pub injected:  u64,
}

impl From<&TickStats> for TickSummaryRow {
    fn from(s: &TickStats) -> Self {
        Self {
            tick:      s.tick,
            time:      s.time,
            arrivals:  s.arrivals as u64,
            entered:   s.departed.entered as u64,
            boarded:   s.boarded as u64,
            alighted:  s.alighted as u64,
            arrived:   s.flushed.arrived as u64,
            timed_out: s.flushed.timed_out as u64,
            injected:  s.disruption.injected as u64,
        }
    }
}
