//! `Path` — an immutable route through the network.
//!
//! A path is a list of stations plus, for every hop between consecutive
//! stations, the line used for that hop:
//!
//! ```text
//! stations:  s0 ── s1 ── s2 ── s3
//! hops:         L1    L1    L2         (transfer L1 → L2 at s2)
//! ```
//!
//! Every operation returns a new value.  Trips that share a graph path hold
//! independent clones, so rerouting one passenger never affects another.

use metro_core::{LineId, StationId};

use crate::{NetworkError, NetworkResult};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    stations: Vec<StationId>,
    hops:     Vec<LineId>,
}

impl Path {
    /// A path with no stations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A path that stays at one station.
    pub fn single(station: StationId) -> Self {
        Self { stations: vec![station], hops: Vec::new() }
    }

    /// Consecutive stations all travelled on `line`.
    pub fn along_line(line: LineId, stations: Vec<StationId>) -> Self {
        let hops = vec![line; stations.len().saturating_sub(1)];
        Self { stations, hops }
    }

    /// Assemble a path from explicit parts.
    ///
    /// Fails if `hops` does not have exactly one entry per hop.  The result
    /// is not checked with [`is_valid`](Self::is_valid).
    pub fn from_parts(stations: Vec<StationId>, hops: Vec<LineId>) -> NetworkResult<Self> {
        if hops.len() != stations.len().saturating_sub(1) {
            return Err(NetworkError::Config(format!(
                "path with {} stations needs {} hops, got {}",
                stations.len(),
                stations.len().saturating_sub(1),
                hops.len()
            )));
        }
        Ok(Self { stations, hops })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn stations(&self) -> &[StationId] {
        &self.stations
    }

    #[inline]
    pub fn hops(&self) -> &[LineId] {
        &self.hops
    }

    /// Number of stations.
    #[inline]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    #[inline]
    pub fn head(&self) -> Option<StationId> {
        self.stations.first().copied()
    }

    #[inline]
    pub fn tail(&self) -> Option<StationId> {
        self.stations.last().copied()
    }

    #[inline]
    pub fn contains(&self, station: StationId) -> bool {
        self.stations.contains(&station)
    }

    pub fn position(&self, station: StationId) -> Option<usize> {
        self.stations.iter().position(|&s| s == station)
    }

    /// The station and line of the hop leaving `station`, if any.
    pub fn next_after(&self, station: StationId) -> Option<(StationId, LineId)> {
        let i = self.position(station)?;
        Some((*self.stations.get(i + 1)?, self.hops[i]))
    }

    /// Distinct lines in travel order (one entry per run of equal hops).
    pub fn lines(&self) -> Vec<LineId> {
        let mut runs: Vec<LineId> = Vec::new();
        for &line in &self.hops {
            if runs.last() != Some(&line) {
                runs.push(line);
            }
        }
        runs
    }

    /// Number of line changes along the path.
    pub fn transfers(&self) -> usize {
        self.lines().len().saturating_sub(1)
    }

    /// `true` if any line is used by both paths.
    pub fn shares_line_with(&self, other: &Path) -> bool {
        self.hops.iter().any(|l| other.hops.contains(l))
    }

    /// `true` if the path travels between `a` and `b` (either way) on `line`
    /// in a single hop.
    pub fn uses_hop(&self, a: StationId, b: StationId, line: LineId) -> bool {
        self.stations
            .windows(2)
            .zip(&self.hops)
            .any(|(w, &l)| l == line && ((w[0] == a && w[1] == b) || (w[0] == b && w[1] == a)))
    }

    // ── Transformations ───────────────────────────────────────────────────

    /// `self` followed by `other`, sharing the junction station once.
    pub fn concat(&self, other: &Path) -> NetworkResult<Path> {
        match (self.tail(), other.head()) {
            (None, _) => Ok(other.clone()),
            (_, None) => Ok(self.clone()),
            (Some(tail), Some(head)) if tail != head => {
                Err(NetworkError::Discontiguous { tail, head })
            }
            _ => {
                let mut stations = Vec::with_capacity(self.len() + other.len() - 1);
                stations.extend_from_slice(&self.stations);
                stations.extend_from_slice(&other.stations[1..]);
                let mut hops = Vec::with_capacity(self.hops.len() + other.hops.len());
                hops.extend_from_slice(&self.hops);
                hops.extend_from_slice(&other.hops);
                Ok(Path { stations, hops })
            }
        }
    }

    /// The same path travelled backwards.
    pub fn inverted(&self) -> Path {
        Path {
            stations: self.stations.iter().rev().copied().collect(),
            hops:     self.hops.iter().rev().copied().collect(),
        }
    }

    /// Stations `from..=to` (indices clamped to the path).
    pub fn segment(&self, from: usize, to: usize) -> Path {
        if self.is_empty() || from > to || from >= self.len() {
            return Path::empty();
        }
        let to = to.min(self.len() - 1);
        Path {
            stations: self.stations[from..=to].to_vec(),
            hops:     self.hops[from..to].to_vec(),
        }
    }

    /// The remainder of the path starting at `station`.
    pub fn from_station(&self, station: StationId) -> Option<Path> {
        let i = self.position(station)?;
        Some(self.segment(i, self.len() - 1))
    }

    /// The beginning of the path up to and including `station`.
    pub fn until_station(&self, station: StationId) -> Option<Path> {
        let i = self.position(station)?;
        Some(self.segment(0, i))
    }

    // ── Validity ──────────────────────────────────────────────────────────

    /// Why the path is malformed, or `None` if it is valid.
    ///
    /// A valid path has one hop per pair of stations, never visits a station
    /// twice, and never returns to a line after leaving it.
    pub fn defect(&self) -> Option<&'static str> {
        if self.hops.len() != self.stations.len().saturating_sub(1) {
            return Some("hop count does not match station count");
        }
        for (i, s) in self.stations.iter().enumerate() {
            if self.stations[..i].contains(s) {
                return Some("station visited twice");
            }
        }
        let runs = self.lines();
        for (i, line) in runs.iter().enumerate() {
            if runs[..i].contains(line) {
                return Some("line re-entered after a transfer");
            }
        }
        None
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.defect().is_none()
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, s) in self.stations.iter().enumerate() {
            if i > 0 {
                write!(f, " -{}-> ", self.hops[i - 1].0)?;
            }
            write!(f, "{}", s.0)?;
        }
        Ok(())
    }
}
