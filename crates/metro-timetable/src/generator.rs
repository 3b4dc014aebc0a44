//! Initial train placement and the planned timetable.

use tracing::debug;

use metro_core::{SimConfig, SimTime, TrainConfig, TrainId};
use metro_network::{Direction, Network};

use crate::{Movement, TimetableError, TimetableResult, Train, next_stop};

/// Place every line's trains evenly around its cycle at `start`.
///
/// Train ids are dense across the whole network, in line order.  A line
/// with `L` stops has a cycle of `2·(L-1)` positions; train `i` of `k` starts
/// at position `⌊i·2(L-1)/k⌋`.  Every train is standing at its first station
/// at `start` and arrives at the following one after one dwell plus the
/// running time.
pub fn initial_trains(network: &Network, trains: &TrainConfig, start: SimTime) -> Vec<Train> {
    let mut out = Vec::new();
    for line in network.lines() {
        let hops = line.stations.len() - 1;
        let cycle = 2 * hops;
        let k = line.train_count as usize;
        for i in 0..k {
            let p = i * cycle / k;
            let (idx, direction) = if p < hops {
                (p, Direction::Up)
            } else {
                (cycle - p, Direction::Down)
            };
            let current = line.stations[idx];
            let Some((next, direction, _)) = next_stop(line, current, direction) else {
                continue;
            };
            let mut train = Train {
                id: TrainId(out.len() as u32),
                line: line.id,
                direction,
                current,
                next,
                arrival_current: start,
                arrival_next: start,
                trip_number: 0,
                capacity: line.capacity,
            };
            train.arrival_next = train.projected_arrival(network, trains.time_in_station_secs);
            out.push(train);
        }
    }
    out
}

/// Planned movements per train, in arrival order, assuming no disruption.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timetable {
    entries: Vec<Vec<Movement>>,
}

impl Timetable {
    /// Run every train from its initial state until `config.end`.
    ///
    /// # Errors
    ///
    /// [`TimetableError::Config`] if a train refers to an unknown line or
    /// would make no progress (zero dwell between co-located stations).
    pub fn generate(network: &Network, initial: &[Train], config: &SimConfig) -> TimetableResult<Self> {
        let end = config.end_time();
        let mut entries = Vec::with_capacity(initial.len());

        for start in initial {
            let line = network
                .lines()
                .get(start.line.index())
                .ok_or_else(|| TimetableError::Config(format!("{} runs on unknown {}", start.id, start.line)))?;
            let mut train = start.clone();
            let mut movements = Vec::new();
            while train.arrival_next < end {
                let m = train.arrive(line, network, &config.trains, &config.business_day, false);
                if m.next_arrival <= m.arrival {
                    return Err(TimetableError::Config(format!(
                        "{} makes no progress after {}",
                        train.id, m.station
                    )));
                }
                movements.push(m);
            }
            entries.push(movements);
        }

        let timetable = Self { entries };
        debug!(trains = timetable.train_count(), movements = timetable.len(), "timetable generated");
        Ok(timetable)
    }

    #[inline]
    pub fn train_count(&self) -> usize {
        self.entries.len()
    }

    /// Planned movements of one train.
    pub fn for_train(&self, id: TrainId) -> &[Movement] {
        self.entries.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every planned movement, grouped by train.
    pub fn iter(&self) -> impl Iterator<Item = &Movement> {
        self.entries.iter().flatten()
    }

    /// Total number of planned movements.
    pub fn len(&self) -> usize {
        self.entries.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
