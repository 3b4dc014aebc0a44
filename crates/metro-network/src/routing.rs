//! Graph lookup with a nearest-reachable fallback.
//!
//! # Fallback
//!
//! When the graph has no path from `from` to `to`, the fallback considers
//! every open station `c` other than the two endpoints such that
//!
//! - `c` is reachable from `from`, and
//! - `c` is strictly closer (great-circle) to `to` than `from` is,
//!
//! and picks the candidate nearest to `to`.  The passenger rides
//! `from → c` and is left to finish the journey by other means.  Ties go to
//! the lower station id.

use metro_core::StationId;

use crate::{Network, Path};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The outcome of a successful routing query.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub path: Path,
    /// `false` when `path` is a fallback that stops short of the destination.
    pub reaches_destination: bool,
}

impl Route {
    /// Station where the route actually ends.
    pub fn end(&self) -> Option<StationId> {
        self.path.tail()
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

impl Network {
    /// A clone of the graph path `from → to`, if any.
    pub fn lookup(&self, from: StationId, to: StationId) -> Option<Route> {
        self.graph()
            .path(from, to)
            .map(|p| Route { path: p.clone(), reaches_destination: true })
    }

    /// The fallback route toward `to`, ignoring any direct path.
    pub fn fallback_toward(&self, from: StationId, to: StationId) -> Option<Route> {
        if !self.is_open(from) {
            return None;
        }
        let target = self.station(to).position;
        let origin_distance = self.station(from).position.distance_m(target);

        let mut best: Option<(f64, StationId)> = None;
        for candidate in self.graph().reachable_from(from) {
            if candidate == to || candidate == from || !self.is_open(candidate) {
                continue;
            }
            let d = self.station(candidate).position.distance_m(target);
            if d >= origin_distance {
                continue;
            }
            if best.is_none_or(|(best_d, _)| d < best_d) {
                best = Some((d, candidate));
            }
        }

        let (_, via) = best?;
        self.graph()
            .path(from, via)
            .map(|p| Route { path: p.clone(), reaches_destination: false })
    }

    /// [`lookup`](Self::lookup), then [`fallback_toward`](Self::fallback_toward).
    pub fn route(&self, from: StationId, to: StationId) -> Option<Route> {
        if from == to {
            return None;
        }
        self.lookup(from, to).or_else(|| self.fallback_toward(from, to))
    }
}
