//! Train state and movement along a line.

use metro_core::{BusinessDay, LineId, SimTime, StationId, TrainConfig, TrainId};
use metro_network::{Direction, Line, Network};

use crate::Movement;

/// A single train shuttling along its line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Train {
    pub id:              TrainId,
    pub line:            LineId,
    pub direction:       Direction,
    /// Station the train last arrived at.
    pub current:         StationId,
    /// Station the train is heading for.
    pub next:            StationId,
    pub arrival_current: SimTime,
    pub arrival_next:    SimTime,
    /// Incremented each time the train reverses at a terminus.
    pub trip_number:     u32,
    pub capacity:        u32,
}

/// The stop after `from` on `line` travelling in `direction`.
///
/// At a terminus the train turns around: the returned direction is reversed
/// and the flag is `true`.  `None` if `from` is not on the line.
pub fn next_stop(line: &Line, from: StationId, direction: Direction) -> Option<(StationId, Direction, bool)> {
    let idx = line.position(from)?;
    match line.next_index(idx, direction) {
        Some(n) => Some((line.stations[n], direction, false)),
        None => {
            let back = direction.reversed();
            let n = line.next_index(idx, back)?;
            Some((line.stations[n], back, true))
        }
    }
}

impl Train {
    /// `true` if the train is travelling the edge `a`–`b` (either way).
    #[inline]
    pub fn is_on_edge(&self, a: StationId, b: StationId) -> bool {
        (self.current == a && self.next == b) || (self.current == b && self.next == a)
    }

    /// Arrival at `next` projected from the current stop:
    /// `arrival_current + dwell + travel + delay`.
    pub fn projected_arrival(&self, network: &Network, dwell: i64) -> SimTime {
        let travel = network.travel_times().between(self.current, self.next);
        let delay = network.delays().get(self.current, self.next);
        self.arrival_current + (dwell + travel + delay)
    }

    /// Move the train to `next`, which it reaches at `arrival_next`.
    ///
    /// `pass_through` means the station is closed: the train does not stop,
    /// so its dwell there is zero.  Returns the movement record for the
    /// arrival, including the projected following hop.
    pub fn arrive(
        &mut self,
        line:         &Line,
        network:      &Network,
        trains:       &TrainConfig,
        business_day: &BusinessDay,
        pass_through: bool,
    ) -> Movement {
        let dwell = if pass_through { 0 } else { trains.time_in_station_secs };

        self.current = self.next;
        self.arrival_current = self.arrival_next;
        if let Some((next, direction, reversed)) = next_stop(line, self.current, self.direction) {
            self.next = next;
            self.direction = direction;
            if reversed {
                self.trip_number += 1;
            }
        }
        self.arrival_next = self.projected_arrival(network, dwell);

        Movement {
            train:          self.id,
            line:           self.line,
            station:        self.current,
            arrival:        self.arrival_current,
            departure:      self.arrival_current + dwell,
            next_station:   self.next,
            next_arrival:   self.arrival_next,
            next_departure: self.arrival_next + trains.time_in_station_secs,
            direction:      self.direction,
            revenue:        business_day.contains(self.arrival_current),
            trip_number:    self.trip_number,
        }
    }

    /// The first open station the train will stop at, starting with `next`.
    ///
    /// Follows the line through terminus reversals.  `None` if every station
    /// of the line is closed.
    pub fn next_open_station(&self, line: &Line, network: &Network) -> Option<StationId> {
        let mut station = self.next;
        let mut direction = self.direction;
        for _ in 0..2 * line.stations.len() {
            if network.is_open(station) {
                return Some(station);
            }
            let (s, d, _) = next_stop(line, station, direction)?;
            station = s;
            direction = d;
        }
        None
    }
}
