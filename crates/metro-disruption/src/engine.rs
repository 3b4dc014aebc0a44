//! `Disruptions` — every event list and the per-tick update.
//!
//! # Tick order
//!
//! ```text
//! 1. station closures: transitions, status changes
//! 2. line closures:    transitions, status changes
//! 3. one graph rebuild if any status changed
//! 4. reroute for every closure that started (and is still active)
//! 5. line delays:      transitions, delay matrix, train re-projection
//! 6. attendance peaks: inject the passengers due this tick
//! ```
//!
//! Status is recomputed from the set of active events, so two overlapping
//! closures of the same station keep it closed until both have ended.

use tracing::{info, warn};

use metro_core::{PassengerKind, SimConfig, SimRng, SimTime, TimeWindow};
use metro_network::Network;
use metro_population::{Passenger, PopulationStore, Trip};
use metro_timetable::Train;

use crate::{
    AttendancePeak, Closure, DisruptionResult, LineClosure, LineDelay, RerouteStats,
    StationClosure, reroute::reroute,
};

/// What the disruption phase of one tick did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub started:  usize,
    pub ended:    usize,
    pub rebuilt:  bool,
    pub reroute:  RerouteStats,
    /// Trains whose next arrival was re-projected for a delay change.
    pub delayed:  usize,
    pub injected: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Disruptions {
    station_closures: Vec<StationClosure>,
    line_closures:    Vec<LineClosure>,
    line_delays:      Vec<LineDelay>,
    attendance_peaks: Vec<AttendancePeak>,
}

impl Disruptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_station_closure(&mut self, e: StationClosure) {
        self.station_closures.push(e);
    }

    pub fn push_line_closure(&mut self, e: LineClosure) {
        self.line_closures.push(e);
    }

    pub fn push_line_delay(&mut self, e: LineDelay) {
        self.line_delays.push(e);
    }

    pub fn push_attendance_peak(&mut self, e: AttendancePeak) {
        self.attendance_peaks.push(e);
    }

    #[inline]
    pub fn station_closures(&self) -> &[StationClosure] {
        &self.station_closures
    }

    #[inline]
    pub fn line_closures(&self) -> &[LineClosure] {
        &self.line_closures
    }

    #[inline]
    pub fn line_delays(&self) -> &[LineDelay] {
        &self.line_delays
    }

    #[inline]
    pub fn attendance_peaks(&self) -> &[AttendancePeak] {
        &self.attendance_peaks
    }

    pub fn len(&self) -> usize {
        self.station_closures.len()
            + self.line_closures.len()
            + self.line_delays.len()
            + self.attendance_peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the disruption phase for the tick ending at `now`.
    ///
    /// # Errors
    ///
    /// Only a graph rebuild failure, which means the network definition is
    /// malformed.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_tick(
        &mut self,
        now:     SimTime,
        network: &mut Network,
        trains:  &mut [Train],
        store:   &mut PopulationStore,
        config:  &SimConfig,
        rng:     &mut SimRng,
    ) -> DisruptionResult<TickReport> {
        let mut report = TickReport::default();

        // ── Closures: transitions and status ──────────────────────────────
        let mut started: Vec<(Closure, TimeWindow)> = Vec::new();

        for e in &mut self.station_closures {
            let t = e.schedule.advance(now);
            if t.started {
                info!(station = %e.station, %now, "station closure started");
                report.started += 1;
            }
            if t.ended {
                info!(station = %e.station, %now, "station closure ended");
                report.ended += 1;
                network.open_station(e.station);
            }
            if t.started && !t.ended {
                started.push((Closure::Station(e.station), e.schedule.window));
            }
        }
        for e in self.station_closures.iter().filter(|e| e.schedule.is_active()) {
            network.close_station(e.station);
        }

        let mut started_lines = Vec::new();
        for (i, e) in self.line_closures.iter_mut().enumerate() {
            let t = e.schedule.advance(now);
            if t.started {
                info!(line = %e.line, from = %e.from, to = %e.to, %now, "line closure started");
                report.started += 1;
            }
            if t.ended {
                info!(line = %e.line, from = %e.from, to = %e.to, %now, "line closure ended");
                report.ended += 1;
                network.open_span(e.line, e.from, e.to)?;
            }
            if t.started && !t.ended {
                started_lines.push(i);
            }
        }
        for (i, e) in self.line_closures.iter().enumerate() {
            if e.schedule.is_active() {
                let stations = network.close_span(e.line, e.from, e.to)?;
                if started_lines.contains(&i) {
                    started.push((Closure::Span { line: e.line, stations }, e.schedule.window));
                }
            }
        }

        if network.needs_rebuild() {
            network.rebuild_graph()?;
            report.rebuilt = true;
        }

        for (closure, window) in &started {
            report.reroute += reroute(closure, *window, now, network, trains, store);
        }

        // ── Delays ────────────────────────────────────────────────────────
        let dwell = config.trains.time_in_station_secs;
        for e in &mut self.line_delays {
            let t = e.schedule.advance(now);
            if t.started {
                info!(from = %e.from, to = %e.to, delay_secs = e.delay_secs, %now, "line delay started");
                report.started += 1;
                network.delays_mut().add(e.from, e.to, e.delay_secs);
            }
            if t.ended {
                info!(from = %e.from, to = %e.to, %now, "line delay ended");
                report.ended += 1;
                network.delays_mut().add(e.from, e.to, -e.delay_secs);
            }
            if !t.is_none() {
                report.delayed += reproject(trains, network, e, dwell, now);
            }
        }

        // ── Attendance peaks ──────────────────────────────────────────────
        for e in &mut self.attendance_peaks {
            let t = e.schedule.advance(now);
            if t.started {
                info!(station = %e.station, size = e.size, %now, "attendance peak started");
                report.started += 1;
            }
            if t.ended {
                report.ended += 1;
            }
            if e.schedule.is_active() || t.ended {
                let due = e.take_due(now);
                if due > 0 {
                    report.injected += inject(e, due, now, network, store, config, rng);
                }
            }
            if t.ended {
                info!(station = %e.station, injected = e.injected(), %now, "attendance peak ended");
            }
        }

        Ok(report)
    }
}

/// Re-project every train currently on the delayed edge.
///
/// The new arrival is `arrival_current + dwell + travel + delay`, never
/// earlier than `now`.
fn reproject(trains: &mut [Train], network: &Network, e: &LineDelay, dwell: i64, now: SimTime) -> usize {
    let mut n = 0;
    for train in trains.iter_mut().filter(|t| t.is_on_edge(e.from, e.to)) {
        train.arrival_next = train.projected_arrival(network, dwell).max(now);
        n += 1;
    }
    n
}

/// Put `count` new passengers into the waiting pool of the peak's station.
fn inject(
    peak:    &AttendancePeak,
    count:   u32,
    now:     SimTime,
    network: &Network,
    store:   &mut PopulationStore,
    config:  &SimConfig,
    rng:     &mut SimRng,
) -> usize {
    let station = peak.station;
    if !network.is_open(station) {
        warn!(%station, count, "attendance peak at a closed station: passengers not injected");
        return 0;
    }
    let destinations: Vec<_> = network.graph().reachable_from(station).collect();
    if destinations.is_empty() {
        warn!(%station, count, "attendance peak station reaches nowhere: passengers not injected");
        return 0;
    }

    let weights = config.population.kinds.weights();
    let mut injected = 0;
    for _ in 0..count {
        let Some(&dest) = rng.choose(&destinations) else { break };
        let Some(path) = network.graph().path(station, dest) else { continue };
        let kind = rng.pick_weighted(&weights).map_or(PassengerKind::default(), |k| PassengerKind::ALL[k]);
        let id = store.allocate_id();
        let mut p = Passenger::new(id, kind, vec![Trip::new(now, path.clone())]);
        p.begin_next_trip();
        store.enter_station(p, station, now);
        injected += 1;
    }
    injected
}
