//! All-pairs path graph, travel-time matrix, and delay matrix.
//!
//! # Data layout
//!
//! All three matrices are dense, row-major `Vec`s of length N×N where N is
//! the station count.  Cell `(i, j)` lives at `i * N + j`.  Station ids are
//! dense, so `StationId::index()` addresses rows and columns directly.
//!
//! # Transfer closure
//!
//! [`Graph::build`] seeds the matrix with every direct (single-line) path
//! and then relaxes it pass by pass:
//!
//! ```text
//! for i, j, k:
//!     if path(i,j) and path(j,k) share no line
//!     and (path(i,k) is unknown or |path(i,j) ++ path(j,k)| < |path(i,k)|):
//!         path(i,k) = path(i,j) ++ path(j,k)
//! ```
//!
//! Every change either adds a reachable pair or shortens a known path, so the
//! loop reaches a fixed point.  It is still capped at N + 1 passes; going
//! past the cap is reported as [`NetworkError::ClosureDiverged`].

use metro_core::{StationId, TrainConfig};

use crate::{Line, NetworkError, NetworkResult, Path, Station};

// ── Physics ───────────────────────────────────────────────────────────────────

/// Seconds to cover `distance_m` from standstill to standstill.
///
/// The train accelerates at `accel` up to `max_speed`, cruises, then brakes
/// at the same rate.  Short hops never reach top speed.  Rounded up.
pub fn travel_secs(distance_m: f64, accel: f64, max_speed: f64) -> i64 {
    if distance_m <= 0.0 {
        return 0;
    }
    let ramp_distance = max_speed * max_speed / accel;
    let secs = if distance_m >= ramp_distance {
        distance_m / max_speed + max_speed / accel
    } else {
        2.0 * (distance_m / accel).sqrt()
    };
    secs.ceil() as i64
}

// ── TravelTimes ───────────────────────────────────────────────────────────────

/// Station-to-station running time in seconds, from great-circle distance.
///
/// Computed once when the network is built; station positions never change.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelTimes {
    n:    usize,
    secs: Vec<i64>,
}

impl TravelTimes {
    pub fn compute(stations: &[Station], trains: &TrainConfig) -> Self {
        let n = stations.len();
        let mut secs = vec![0; n * n];
        for a in stations {
            for b in stations {
                if a.id != b.id {
                    let d = a.position.distance_m(b.position);
                    secs[a.id.index() * n + b.id.index()] =
                        travel_secs(d, trains.acceleration_mps2, trains.max_speed_mps);
                }
            }
        }
        Self { n, secs }
    }

    #[inline]
    pub fn between(&self, from: StationId, to: StationId) -> i64 {
        self.secs[from.index() * self.n + to.index()]
    }

    /// Running time along `path`, hop by hop, excluding dwell.
    pub fn along(&self, path: &Path) -> i64 {
        path.stations().windows(2).map(|w| self.between(w[0], w[1])).sum()
    }
}

// ── DelayMatrix ───────────────────────────────────────────────────────────────

/// Extra running time per station pair, in seconds.  Symmetric.
#[derive(Clone, Debug, PartialEq)]
pub struct DelayMatrix {
    n:    usize,
    secs: Vec<i64>,
}

impl DelayMatrix {
    pub fn zeros(n: usize) -> Self {
        Self { n, secs: vec![0; n * n] }
    }

    #[inline]
    pub fn get(&self, a: StationId, b: StationId) -> i64 {
        self.secs[a.index() * self.n + b.index()]
    }

    /// Set the delay on the edge `a`–`b` in both directions.
    pub fn set(&mut self, a: StationId, b: StationId, secs: i64) {
        self.secs[a.index() * self.n + b.index()] = secs;
        self.secs[b.index() * self.n + a.index()] = secs;
    }

    /// Add `secs` to the edge `a`–`b` in both directions.
    pub fn add(&mut self, a: StationId, b: StationId, secs: i64) {
        let current = self.get(a, b);
        self.set(a, b, current + secs);
    }

    /// `true` if no edge carries a delay.
    pub fn is_clear(&self) -> bool {
        self.secs.iter().all(|&s| s == 0)
    }
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// The all-pairs matrix of canonical shortest paths.
///
/// `path(i, j)` is the path with the fewest stations from `i` to `j`, or
/// `None` when `j` is unreachable from `i`.  The diagonal is always `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    n:      usize,
    paths:  Vec<Option<Path>>,
    convex: bool,
    passes: usize,
}

impl Graph {
    /// Build the matrix for the current station and line status.
    ///
    /// # Errors
    ///
    /// [`NetworkError::InvalidPath`] if a materialized path fails
    /// [`Path::is_valid`], [`NetworkError::ClosureDiverged`] if the closure
    /// exceeds its pass bound.  Both mean the network definition is
    /// malformed.
    pub fn build(stations: &[Station], lines: &[Line]) -> NetworkResult<Self> {
        let n = stations.len();
        let mut graph = Self { n, paths: vec![None; n * n], convex: false, passes: 0 };

        graph.seed_direct_paths(stations, lines);
        graph.close_transfers(stations)?;
        graph.check_validity()?;
        graph.convex = graph.compute_convex(stations);
        Ok(graph)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn station_count(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn path(&self, from: StationId, to: StationId) -> Option<&Path> {
        if from.index() >= self.n || to.index() >= self.n {
            return None;
        }
        self.paths[from.index() * self.n + to.index()].as_ref()
    }

    #[inline]
    pub fn is_reachable(&self, from: StationId, to: StationId) -> bool {
        self.path(from, to).is_some()
    }

    /// Every station reachable from `from`, ascending.
    pub fn reachable_from(&self, from: StationId) -> impl Iterator<Item = StationId> + '_ {
        let row = from.index() * self.n;
        (0..self.n)
            .filter(move |&j| self.paths[row + j].is_some())
            .map(|j| StationId(j as u32))
    }

    /// `true` if every ordered pair of distinct open stations is connected.
    #[inline]
    pub fn is_convex(&self) -> bool {
        self.convex
    }

    /// Closure passes the last build needed, including the settling pass.
    #[inline]
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Number of non-null cells.
    pub fn path_count(&self) -> usize {
        self.paths.iter().filter(|p| p.is_some()).count()
    }

    // ── Build steps ───────────────────────────────────────────────────────

    #[inline]
    fn idx(&self, from: usize, to: usize) -> usize {
        from * self.n + to
    }

    /// Step 1: every pair of stops on the same line, both directions.
    ///
    /// A segment is skipped if any stop on it is closed or any of its hops is
    /// closed.  Lines are visited in id order and only a strictly shorter
    /// segment replaces an existing one, so ties go to the lower line id.
    fn seed_direct_paths(&mut self, stations: &[Station], lines: &[Line]) {
        for line in lines {
            let stops = &line.stations;
            for a in 0..stops.len() {
                if !stations[stops[a].index()].is_open() {
                    continue;
                }
                for b in (a + 1)..stops.len() {
                    if !stations[stops[b].index()].is_open() {
                        // Every later stop lies behind this closed one.
                        break;
                    }
                    if line.is_hop_closed(b - 1, b) {
                        break;
                    }
                    let forward = line.segment(a, b);
                    let backward = forward.inverted();
                    self.offer(stops[a].index(), stops[b].index(), forward);
                    self.offer(stops[b].index(), stops[a].index(), backward);
                }
            }
        }
    }

    fn offer(&mut self, from: usize, to: usize, path: Path) {
        let cell = self.idx(from, to);
        match &self.paths[cell] {
            Some(existing) if existing.len() <= path.len() => {}
            _ => self.paths[cell] = Some(path),
        }
    }

    /// Step 2: transfer closure to a fixed point.
    fn close_transfers(&mut self, stations: &[Station]) -> NetworkResult<()> {
        let n = self.n;
        let open: Vec<bool> = stations.iter().map(Station::is_open).collect();
        let max_passes = n + 1;

        for pass in 1..=max_passes {
            let mut changed = false;

            for i in 0..n {
                if !open[i] {
                    continue;
                }
                for j in 0..n {
                    if i == j || !open[j] {
                        continue;
                    }
                    let Some(head_len) = self.paths[self.idx(i, j)].as_ref().map(Path::len) else {
                        continue;
                    };
                    for k in 0..n {
                        if k == i || k == j || !open[k] {
                            continue;
                        }
                        let Some(tail_len) = self.paths[self.idx(j, k)].as_ref().map(Path::len) else {
                            continue;
                        };
                        let candidate_len = head_len + tail_len - 1;
                        if self.paths[self.idx(i, k)].as_ref().is_some_and(|known| known.len() <= candidate_len) {
                            continue;
                        }
                        let (Some(head), Some(tail)) = (&self.paths[self.idx(i, j)], &self.paths[self.idx(j, k)])
                        else {
                            continue;
                        };
                        if head.shares_line_with(tail) {
                            continue;
                        }
                        let composed = match head.concat(tail) {
                            Ok(p) if p.is_valid() => p,
                            _ => continue,
                        };
                        let cell = self.idx(i, k);
                        self.paths[cell] = Some(composed);
                        changed = true;
                    }
                }
            }

            if !changed {
                self.passes = pass;
                return Ok(());
            }
        }

        Err(NetworkError::ClosureDiverged { passes: max_passes })
    }

    /// Step 3: every materialized path must be well formed.
    fn check_validity(&self) -> NetworkResult<()> {
        for i in 0..self.n {
            for j in 0..self.n {
                if let Some(path) = &self.paths[self.idx(i, j)] {
                    let from = StationId(i as u32);
                    let to = StationId(j as u32);
                    if let Some(reason) = path.defect() {
                        return Err(NetworkError::InvalidPath { from, to, reason });
                    }
                    if path.head() != Some(from) || path.tail() != Some(to) {
                        return Err(NetworkError::InvalidPath {
                            from,
                            to,
                            reason: "endpoints do not match the cell",
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Step 4: liveness flag.
    fn compute_convex(&self, stations: &[Station]) -> bool {
        let open: Vec<usize> = stations
            .iter()
            .filter(|s| s.is_open())
            .map(|s| s.id.index())
            .collect();
        open.iter().all(|&i| {
            open.iter().all(|&j| i == j || self.paths[self.idx(i, j)].is_some())
        })
    }
}
