//! One train movement: arrival at a station and the projected next hop.

use metro_core::{LineId, SimTime, StationId, TrainId};
use metro_network::Direction;

/// A record of a train arriving at `station`.
///
/// The same record describes planned timetable entries and logged real
/// movements.  `revenue` is `true` when the arrival falls inside the
/// business day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Movement {
    pub train:          TrainId,
    pub line:           LineId,
    pub station:        StationId,
    pub arrival:        SimTime,
    pub departure:      SimTime,
    pub next_station:   StationId,
    pub next_arrival:   SimTime,
    pub next_departure: SimTime,
    pub direction:      Direction,
    pub revenue:        bool,
    pub trip_number:    u32,
}

impl Movement {
    /// Seconds spent at `station`.
    #[inline]
    pub fn dwell_secs(&self) -> i64 {
        self.departure - self.arrival
    }
}
