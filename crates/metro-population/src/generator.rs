//! Seeded random population.

use tracing::{debug, warn};

use metro_core::{PassengerId, PassengerKind, SimConfig, SimRng, SimTime, StationId, TimeWindow, TripPattern};
use metro_network::{Network, Path};

use crate::{Passenger, PopulationError, PopulationResult, Trip};

/// Draws of a station pair before a pattern gives up and degrades to one way.
const MAX_ATTEMPTS: usize = 32;

/// Generate `config.population.size` passengers with ids `0..size`.
///
/// Departures are uniform inside the part of the first day's business
/// window that the run covers, and sorted within each passenger.  When the
/// run does not overlap the business day at all, the run window is used.
///
/// # Errors
///
/// [`PopulationError::Config`] if passengers are requested but no pair of
/// open stations is connected.
pub fn generate_population(
    network: &Network,
    config:  &SimConfig,
    rng:     &mut SimRng,
) -> PopulationResult<Vec<Passenger>> {
    let size = config.population.size;
    if size == 0 {
        return Ok(Vec::new());
    }

    let origins: Vec<StationId> = network
        .stations()
        .iter()
        .filter(|s| s.is_open() && network.graph().reachable_from(s.id).next().is_some())
        .map(|s| s.id)
        .collect();
    if origins.is_empty() {
        return Err(PopulationError::Config(
            "cannot generate trips: no two open stations are connected".into(),
        ));
    }

    let run = TimeWindow::new(config.start_time(), config.end_time());
    let window = match config.business_day.window_on(config.start_time()).intersect(&run) {
        Some(w) => w,
        None if run.duration_secs() > 0 => {
            warn!(%run, "run does not overlap the business day: departures drawn over the run");
            run
        }
        None => {
            return Err(PopulationError::Config(format!("empty simulation window {run}")));
        }
    };
    let kind_weights = config.population.kinds.weights();
    let pattern_weights = config.population.trip_patterns.weights();

    let mut degraded = 0usize;
    let mut passengers = Vec::with_capacity(size);
    for i in 0..size {
        let kind = rng
            .pick_weighted(&kind_weights)
            .map_or(PassengerKind::default(), |k| PassengerKind::ALL[k]);
        let pattern = rng
            .pick_weighted(&pattern_weights)
            .map_or(TripPattern::OneWay, |k| TripPattern::ALL[k]);

        let paths = match draw_paths(network, &origins, pattern, rng) {
            Some(paths) => paths,
            None => {
                degraded += 1;
                draw_paths(network, &origins, TripPattern::OneWay, rng).unwrap_or_default()
            }
        };

        let mut departures: Vec<i64> = (0..paths.len())
            .map(|_| rng.gen_range(window.start.0..window.end.0))
            .collect();
        departures.sort_unstable();

        let trips = paths
            .into_iter()
            .zip(departures)
            .map(|(path, dep)| Trip::new(SimTime(dep), path))
            .collect();
        passengers.push(Passenger::new(PassengerId(i as u64), kind, trips));
    }

    if degraded > 0 {
        warn!(degraded, "passengers fell back to one-way trips: return path not found");
    }
    debug!(size, "population generated");
    Ok(passengers)
}

/// Station paths for one passenger's `pattern`, or `None` after
/// [`MAX_ATTEMPTS`] failed draws.
fn draw_paths(
    network: &Network,
    origins: &[StationId],
    pattern: TripPattern,
    rng:     &mut SimRng,
) -> Option<Vec<Path>> {
    let graph = network.graph();
    for _ in 0..MAX_ATTEMPTS {
        let a = *rng.choose(origins)?;
        let reachable: Vec<StationId> = graph.reachable_from(a).collect();
        let Some(&b) = rng.choose(&reachable) else { continue };
        let Some(ab) = graph.path(a, b) else { continue };

        match pattern {
            TripPattern::OneWay => return Some(vec![ab.clone()]),
            TripPattern::RoundTrip => {
                if let Some(ba) = graph.path(b, a) {
                    return Some(vec![ab.clone(), ba.clone()]);
                }
            }
            TripPattern::Chain => {
                let onward: Vec<StationId> = graph.reachable_from(b).filter(|&c| c != a).collect();
                let Some(&c) = rng.choose(&onward) else { continue };
                if let (Some(bc), Some(ca)) = (graph.path(b, c), graph.path(c, a)) {
                    return Some(vec![ab.clone(), bc.clone(), ca.clone()]);
                }
            }
        }
    }
    None
}
