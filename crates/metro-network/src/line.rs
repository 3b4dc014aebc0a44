//! Lines and travel direction.

use metro_core::{LineId, StationId};

use crate::Path;

/// Direction of travel along a line.
///
/// `Up` follows the line's station list in order, `Down` walks it backwards.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[inline]
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Up   => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up   => "up",
            Direction::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of stops served by a fleet of identical trains.
///
/// Hop `i` joins `stations[i]` and `stations[i + 1]`.  A closed hop cannot be
/// part of any passenger path; trains keep running through it.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub id:          LineId,
    pub name:        String,
    pub stations:    Vec<StationId>,
    pub train_count: u32,
    pub capacity:    u32,
    closed_hops:     Vec<bool>,
}

impl Line {
    pub(crate) fn new(
        id:          LineId,
        name:        String,
        stations:    Vec<StationId>,
        train_count: u32,
        capacity:    u32,
    ) -> Self {
        let hops = stations.len().saturating_sub(1);
        Self { id, name, stations, train_count, capacity, closed_hops: vec![false; hops] }
    }

    /// Number of hops (one less than the number of stations).
    #[inline]
    pub fn hop_count(&self) -> usize {
        self.closed_hops.len()
    }

    /// Index of `station` in the stop list.
    pub fn position(&self, station: StationId) -> Option<usize> {
        self.stations.iter().position(|&s| s == station)
    }

    #[inline]
    pub fn serves(&self, station: StationId) -> bool {
        self.position(station).is_some()
    }

    /// The station at the end of the line when travelling in `direction`.
    pub fn terminus(&self, direction: Direction) -> StationId {
        match direction {
            Direction::Up   => self.stations[self.stations.len() - 1],
            Direction::Down => self.stations[0],
        }
    }

    /// Index of the stop after `index` in `direction`, or `None` at a terminus.
    pub fn next_index(&self, index: usize, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Up if index + 1 < self.stations.len() => Some(index + 1),
            Direction::Down if index > 0                     => Some(index - 1),
            _ => None,
        }
    }

    /// `true` if the hop between two adjacent stop indices is closed.
    #[inline]
    pub fn is_hop_closed(&self, a: usize, b: usize) -> bool {
        let hop = a.min(b);
        self.closed_hops.get(hop).copied().unwrap_or(false)
    }

    /// `true` if any hop is closed.
    pub fn has_closures(&self) -> bool {
        self.closed_hops.iter().any(|&c| c)
    }

    /// Close or reopen every hop between stop indices `a` and `b`.
    ///
    /// Returns `true` if at least one hop changed state.
    pub(crate) fn set_span_closed(&mut self, a: usize, b: usize, closed: bool) -> bool {
        let (lo, hi) = (a.min(b), a.max(b));
        let mut changed = false;
        for hop in &mut self.closed_hops[lo..hi] {
            changed |= *hop != closed;
            *hop = closed;
        }
        changed
    }

    /// `true` if the line joins `a` and `b` with a single closed hop.
    pub fn hop_between_is_closed(&self, a: StationId, b: StationId) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(i), Some(j)) if i.abs_diff(j) == 1 => self.is_hop_closed(i, j),
            _ => false,
        }
    }

    /// The direct path from stop index `from` to stop index `to`, in either
    /// direction along the line.
    pub fn segment(&self, from: usize, to: usize) -> Path {
        let stations: Vec<StationId> = if from <= to {
            self.stations[from..=to].to_vec()
        } else {
            self.stations[to..=from].iter().rev().copied().collect()
        };
        Path::along_line(self.id, stations)
    }
}
