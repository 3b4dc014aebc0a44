//! The network model and its builder.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to station ids.  Rerouting uses
//! it to find the nearest open station to a closed one, and to find a nearby
//! station a passenger can walk to.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use tracing::debug;

use metro_core::{GeoPoint, LineId, StationId, TrainConfig};

use crate::{
    DelayMatrix, Graph, Line, NetworkError, NetworkResult, Path, Station, StationStatus, TravelTimes,
};

// ── R-tree station entry ──────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct StationEntry {
    point: [f64; 2], // [lat, lon]
    id:    StationId,
}

impl RTreeObject for StationEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StationEntry {
    /// Squared Euclidean distance in lat/lon space.  Only the ordering is
    /// used, and at city scale it matches great-circle ordering.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Stations, lines, and everything derived from them.
///
/// Status changes go through [`close_station`](Self::close_station),
/// [`close_span`](Self::close_span) and their reopening counterparts; they
/// only flag the change.  The caller decides when to pay for
/// [`rebuild_graph`](Self::rebuild_graph), so several closures starting in
/// the same tick share one rebuild.
#[derive(Debug)]
pub struct Network {
    stations: Vec<Station>,
    lines:    Vec<Line>,
    graph:    Graph,
    travel:   TravelTimes,
    delays:   DelayMatrix,
    spatial:  RTree<StationEntry>,
    /// Incremented by every rebuild.
    generation: u64,
    dirty:      bool,
}

impl Network {
    // ── Read access ───────────────────────────────────────────────────────

    #[inline]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    #[inline]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[inline]
    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.index()]
    }

    #[inline]
    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.index()]
    }

    #[inline]
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    #[inline]
    pub fn is_open(&self, id: StationId) -> bool {
        self.stations[id.index()].is_open()
    }

    /// `true` if every station of `path` is open and none of its hops is
    /// closed on the line it rides.
    pub fn is_path_open(&self, path: &Path) -> bool {
        path.stations().iter().all(|&s| self.is_open(s))
            && path.stations().windows(2).zip(path.hops()).all(|(w, &l)| {
                self.lines.get(l.index()).is_some_and(|line| !line.hop_between_is_closed(w[0], w[1]))
            })
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn travel_times(&self) -> &TravelTimes {
        &self.travel
    }

    #[inline]
    pub fn delays(&self) -> &DelayMatrix {
        &self.delays
    }

    #[inline]
    pub fn delays_mut(&mut self) -> &mut DelayMatrix {
        &mut self.delays
    }

    /// Number of completed graph rebuilds since construction.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` if a status changed since the last rebuild.
    #[inline]
    pub fn needs_rebuild(&self) -> bool {
        self.dirty
    }

    /// Look up a station by name.
    pub fn station_by_name(&self, name: &str) -> Option<StationId> {
        self.stations.iter().find(|s| s.name == name).map(|s| s.id)
    }

    /// Look up a line by name.
    pub fn line_by_name(&self, name: &str) -> Option<LineId> {
        self.lines.iter().find(|l| l.name == name).map(|l| l.id)
    }

    pub fn check_station(&self, id: StationId) -> NetworkResult<()> {
        if id.index() < self.stations.len() {
            Ok(())
        } else {
            Err(NetworkError::StationNotFound(id))
        }
    }

    // ── Status changes ────────────────────────────────────────────────────

    /// Mark a station closed.  Returns `true` if its status changed.
    pub fn close_station(&mut self, id: StationId) -> bool {
        self.set_station_status(id, StationStatus::Closed)
    }

    /// Mark a station open.  Returns `true` if its status changed.
    pub fn open_station(&mut self, id: StationId) -> bool {
        self.set_station_status(id, StationStatus::Open)
    }

    fn set_station_status(&mut self, id: StationId, status: StationStatus) -> bool {
        let station = &mut self.stations[id.index()];
        if station.status == status {
            return false;
        }
        station.status = status;
        self.dirty = true;
        true
    }

    /// Close every hop of `line` between stations `from` and `to`.
    ///
    /// Returns the stations of the closed span in line order.
    pub fn close_span(
        &mut self,
        line: LineId,
        from: StationId,
        to:   StationId,
    ) -> NetworkResult<Vec<StationId>> {
        self.set_span(line, from, to, true)
    }

    /// Reopen every hop of `line` between `from` and `to`.
    pub fn open_span(
        &mut self,
        line: LineId,
        from: StationId,
        to:   StationId,
    ) -> NetworkResult<Vec<StationId>> {
        self.set_span(line, from, to, false)
    }

    fn set_span(
        &mut self,
        line:   LineId,
        from:   StationId,
        to:     StationId,
        closed: bool,
    ) -> NetworkResult<Vec<StationId>> {
        let l = self.lines.get_mut(line.index()).ok_or(NetworkError::LineNotFound(line))?;
        let a = l.position(from).ok_or(NetworkError::NotOnLine { station: from, line })?;
        let b = l.position(to).ok_or(NetworkError::NotOnLine { station: to, line })?;
        if l.set_span_closed(a, b, closed) {
            self.dirty = true;
        }
        let (lo, hi) = (a.min(b), a.max(b));
        Ok(l.stations[lo..=hi].to_vec())
    }

    /// Recompute the path matrix from the current statuses.
    ///
    /// Delays are kept.  A rebuild with no status change since the previous
    /// one produces an identical matrix.
    pub fn rebuild_graph(&mut self) -> NetworkResult<()> {
        self.graph = Graph::build(&self.stations, &self.lines)?;
        self.generation += 1;
        self.dirty = false;
        debug!(
            generation = self.generation,
            passes = self.graph.passes(),
            paths = self.graph.path_count(),
            convex = self.graph.is_convex(),
            "path graph rebuilt"
        );
        Ok(())
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Open stations ordered by distance from `pos`, nearest first.
    pub fn open_stations_near(&self, pos: GeoPoint) -> impl Iterator<Item = StationId> + '_ {
        self.spatial
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .map(|e| e.id)
            .filter(|&id| self.is_open(id))
    }

    /// The open station nearest to `station`, other than itself.
    pub fn nearest_open_station(&self, station: StationId) -> Option<StationId> {
        let pos = self.station(station).position;
        self.open_stations_near(pos).find(|&id| id != station)
    }

    /// Great-circle distance between two stations in metres.
    #[inline]
    pub fn distance_m(&self, a: StationId, b: StationId) -> f64 {
        self.station(a).position.distance_m(self.station(b).position)
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Network`] incrementally, then call [`build`](Self::build).
///
/// Ids are assigned densely in insertion order, so whatever ids the source
/// data used are replaced by collection indices.
///
/// # Example
///
/// ```
/// use metro_core::{GeoPoint, TrainConfig};
/// use metro_network::NetworkBuilder;
///
/// let mut b = NetworkBuilder::new();
/// let a = b.add_station("A", GeoPoint::new(48.85, 2.35), None);
/// let c = b.add_station("C", GeoPoint::new(48.86, 2.35), None);
/// b.add_line("1", vec![a, c], 2, None);
/// let net = b.build(&TrainConfig::default()).unwrap();
/// assert_eq!(net.graph().path(a, c).unwrap().len(), 2);
/// ```
#[derive(Default)]
pub struct NetworkBuilder {
    stations: Vec<Station>,
    lines:    Vec<RawLine>,
}

struct RawLine {
    name:        String,
    stations:    Vec<StationId>,
    train_count: u32,
    capacity:    Option<u32>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a station and return its id (sequential from 0).
    pub fn add_station(&mut self, name: impl Into<String>, position: GeoPoint, area: Option<u32>) -> StationId {
        let id = StationId(self.stations.len() as u32);
        self.stations.push(Station {
            id,
            name: name.into(),
            position,
            status: StationStatus::Open,
            area,
            lines: Vec::new(),
        });
        id
    }

    /// Add a line through `stations` in travel order and return its id.
    ///
    /// `capacity` falls back to [`TrainConfig::default_capacity`] at build time.
    pub fn add_line(
        &mut self,
        name:        impl Into<String>,
        stations:    Vec<StationId>,
        train_count: u32,
        capacity:    Option<u32>,
    ) -> LineId {
        let id = LineId(self.lines.len() as u32);
        self.lines.push(RawLine { name: name.into(), stations, train_count, capacity });
        id
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Validate the topology, compute travel times and the initial graph.
    ///
    /// # Errors
    ///
    /// A line with fewer than two stations, a line visiting a station twice,
    /// or a reference to an unknown station is a configuration error, as is
    /// any failure of the initial graph build.
    pub fn build(self, trains: &TrainConfig) -> NetworkResult<Network> {
        let mut stations = self.stations;
        let mut lines = Vec::with_capacity(self.lines.len());

        for (i, raw) in self.lines.into_iter().enumerate() {
            let id = LineId(i as u32);
            if raw.stations.len() < 2 {
                return Err(NetworkError::Config(format!(
                    "line {:?} has {} station(s), at least 2 are required",
                    raw.name,
                    raw.stations.len()
                )));
            }
            for (k, s) in raw.stations.iter().enumerate() {
                if s.index() >= stations.len() {
                    return Err(NetworkError::StationNotFound(*s));
                }
                if raw.stations[..k].contains(s) {
                    return Err(NetworkError::Config(format!(
                        "line {:?} visits {s} twice",
                        raw.name
                    )));
                }
                stations[s.index()].lines.push(id);
            }
            let capacity = raw.capacity.unwrap_or(trains.default_capacity);
            lines.push(Line::new(id, raw.name, raw.stations, raw.train_count, capacity));
        }

        let travel = TravelTimes::compute(&stations, trains);
        let graph = Graph::build(&stations, &lines)?;
        let delays = DelayMatrix::zeros(stations.len());

        let entries: Vec<StationEntry> = stations
            .iter()
            .map(|s| StationEntry { point: [s.position.lat, s.position.lon], id: s.id })
            .collect();
        let spatial = RTree::bulk_load(entries);

        debug!(
            stations = stations.len(),
            lines = lines.len(),
            convex = graph.is_convex(),
            "network built"
        );

        Ok(Network {
            stations,
            lines,
            graph,
            travel,
            delays,
            spatial,
            generation: 0,
            dirty: false,
        })
    }
}
