//! The `Simulation` struct and its tick loop.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use metro_core::{DayType, SimConfig, SimRng, SimTime};
use metro_disruption::Disruptions;
use metro_network::Network;
use metro_population::{Exchange, PopulationStore, Transfer};
use metro_timetable::{Movement, Timetable, Train};

use crate::{NoopObserver, RunSummary, SimObserver, SimResult, TickStats, TripCounts};

/// Time step when no train is running.
const IDLE_STEP_SECS: i64 = 60;

// ── Simulation ────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// Each tick ([`run_once`](Self::run_once)) runs five phases:
///
/// 1. **Time**: the next time is the earliest train arrival widened by the
///    dwell time (at least one second past the current time, at most the
///    configured end).  Trains due before it are collected.
/// 2. **Disruptions**: lifecycle transitions, status changes, one graph
///    rebuild, rerouting, delays, attendance-peak injection.
/// 3. **Departures**: outside passengers whose next trip departs before the
///    new time enter their origin station, stamped no earlier than the old
///    time.
/// 4. **Flush**: passengers at their destination, or waiting too long, leave.
/// 5. **Trains** (parallel with the `parallel` feature): every collected
///    train arrives at its next station, exchanges passengers there unless
///    the station is closed, and logs a movement.
///
/// The pool moves of a tick are kept until the next tick starts, see
/// [`last_transfers`](Self::last_transfers).
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    pub(crate) config:      SimConfig,
    pub(crate) network:     Network,
    pub(crate) timetable:   Timetable,
    pub(crate) trains:      Vec<Train>,
    pub(crate) store:       PopulationStore,
    pub(crate) disruptions: Disruptions,
    pub(crate) rng:         SimRng,
    /// Every movement so far, tick by tick, by train id within a tick.
    pub(crate) movements:   Vec<Movement>,
    /// Pool moves of the last tick, drained from the store's log.
    pub(crate) transfers:   Vec<Transfer>,
    pub(crate) now:         SimTime,
    pub(crate) ticks:       u64,
}

impl Simulation {
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The undisrupted plan generated at build time.
    #[inline]
    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    #[inline]
    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    #[inline]
    pub fn store(&self) -> &PopulationStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut PopulationStore {
        &mut self.store
    }

    #[inline]
    pub fn disruptions(&self) -> &Disruptions {
        &self.disruptions
    }

    #[inline]
    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    /// Pool moves made by the last tick, by passenger id, each passenger's
    /// moves in the order they happened.
    #[inline]
    pub fn last_transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Ticks executed since the simulation was built.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.now >= self.config.end_time()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until the end time, or for at most `budget` ticks when `budget`
    /// is positive.
    ///
    /// `day_type` labels the run (`weekday`, `saturday`, `sunday`,
    /// `holiday`) and is echoed in the summary.
    pub fn run(&mut self, day_type: &str, budget: i64) -> SimResult<RunSummary> {
        self.run_with(day_type, budget, &mut NoopObserver)
    }

    /// [`run`](Self::run) with observer callbacks.
    pub fn run_with<O: SimObserver>(
        &mut self,
        day_type: &str,
        budget:   i64,
        observer: &mut O,
    ) -> SimResult<RunSummary> {
        let day_type: DayType = day_type.parse()?;
        let start = self.now;
        let end = self.config.end_time();
        info!(%day_type, %start, %end, budget, "run started");
        observer.on_run_start(day_type, start);

        let first_movement = self.movements.len();
        let mut ticks: u64 = 0;
        let (mut boarded, mut alighted, mut injected, mut started, mut ended) = (0, 0, 0, 0, 0);

        while !self.is_finished() && (budget <= 0 || ticks < budget as u64) {
            let before = self.movements.len();
            let stats = self.run_once()?;
            ticks += 1;
            boarded += stats.boarded;
            alighted += stats.alighted;
            injected += stats.disruption.injected;
            started += stats.disruption.started;
            ended += stats.disruption.ended;

            observer.on_movements(&self.movements[before..]);
            observer.on_transfers(&self.transfers);
            observer.on_tick_end(&stats);
        }

        let summary = RunSummary {
            day_type,
            start,
            end: self.now,
            ticks,
            movements: self.movements.len() - first_movement,
            passengers: self.store.total(),
            trips: TripCounts::from_store(&self.store),
            boarded,
            alighted,
            injected,
            started,
            ended,
        };
        info!(
            %day_type,
            ticks,
            end        = %summary.end,
            movements  = summary.movements,
            passengers = summary.passengers,
            completed  = summary.trips.completed,
            abandoned  = summary.trips.abandoned,
            "run finished"
        );
        observer.on_sim_end(&summary, &self.store);
        Ok(summary)
    }

    /// Execute one tick.  Does nothing once the end time is reached.
    pub fn run_once(&mut self) -> SimResult<TickStats> {
        let old = self.now;
        let mut stats = TickStats { tick: self.ticks, from: old, time: old, ..TickStats::default() };
        if self.is_finished() {
            return Ok(stats);
        }

        self.transfers.clear();

        // ── Phase 1: time advance ─────────────────────────────────────────
        let new_time = self.next_time();
        stats.time = new_time;
        stats.tick = self.ticks + 1;

        // ── Phase 2: disruptions ──────────────────────────────────────────
        stats.disruption = self.disruptions.apply_tick(
            new_time,
            &mut self.network,
            &mut self.trains,
            &mut self.store,
            &self.config,
            &mut self.rng,
        )?;

        // ── Phases 3–4: passenger flow ────────────────────────────────────
        stats.departed = self.store.depart_before(old, new_time, &self.network);
        stats.flushed = self.store.flush_stations(new_time, self.config.max_wait_in_station_secs);

        // ── Phase 5: trains ───────────────────────────────────────────────
        let (exchanges, mut tick_log) = self.move_trains(new_time);
        tick_log.sort_by_key(|m| m.train);
        stats.arrivals = tick_log.len();
        for e in &exchanges {
            stats.alighted += e.alighted;
            stats.boarded += e.boarded;
        }
        self.movements.append(&mut tick_log);
        // Trains log concurrently; a stable sort keeps each passenger's moves in order.
        self.transfers = self.store.take_transfers();
        self.transfers.sort_by_key(|t| t.passenger);

        self.now = new_time;
        self.ticks += 1;

        if self.config.debug {
            self.store.check_exclusive()?;
            debug!(
                tick      = stats.tick,
                time      = %new_time,
                arrivals  = stats.arrivals,
                entered   = stats.departed.entered,
                arrived   = stats.flushed.arrived,
                timed_out = stats.flushed.timed_out,
                boarded   = stats.boarded,
                alighted  = stats.alighted,
                outside   = self.store.outside().len(),
                waiting   = self.store.stations().total(),
                riding    = self.store.trains().total(),
                "tick"
            );
        }
        Ok(stats)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    /// Earliest arrival widened by the dwell time, strictly after `now`,
    /// clamped to the end time.
    fn next_time(&self) -> SimTime {
        let dwell = self.config.trains.time_in_station_secs.max(1);
        let step = match self.trains.iter().map(|t| t.arrival_next).min() {
            Some(earliest) => earliest + dwell,
            None => self.now + IDLE_STEP_SECS,
        };
        step.max(self.now + 1).min(self.config.end_time())
    }

    /// Move every train due before `new_time` one station on.
    ///
    /// With the `parallel` feature the trains run on Rayon's thread pool;
    /// the station lock taken by `PopulationStore::exchange` serializes two
    /// trains stopping at the same station.
    fn move_trains(&mut self, new_time: SimTime) -> (Vec<Exchange>, Vec<Movement>) {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let network = &self.network;
        let store   = &self.store;
        let config  = &self.config;
        let trains  = &mut self.trains;
        let log     = Mutex::new(Vec::new());

        #[cfg(not(feature = "parallel"))]
        let exchanges: Vec<Exchange> = trains
            .iter_mut()
            .filter(|t| t.arrival_next < new_time)
            .map(|t| arrive(t, network, store, config, &log))
            .collect();

        #[cfg(feature = "parallel")]
        let exchanges: Vec<Exchange> = {
            use rayon::prelude::*;

            trains
                .par_iter_mut()
                .filter(|t| t.arrival_next < new_time)
                .map(|t| arrive(t, network, store, config, &log))
                .collect()
        };

        (exchanges, log.into_inner().unwrap_or_else(PoisonError::into_inner))
    }
}

/// One train reaches its next station.
///
/// A closed station is passed through: zero dwell, no exchange, but the
/// movement is still logged.
fn arrive(
    train:   &mut Train,
    network: &Network,
    store:   &PopulationStore,
    config:  &SimConfig,
    log:     &Mutex<Vec<Movement>>,
) -> Exchange {
    let line = network.line(train.line);
    let pass_through = !network.is_open(train.next);
    let movement = train.arrive(line, network, &config.trains, &config.business_day, pass_through);

    let exchange = if pass_through {
        Exchange::default()
    } else {
        store.exchange(movement.station, train.id, (train.next, train.line), train.capacity, movement.arrival)
    };

    log.lock().unwrap_or_else(PoisonError::into_inner).push(movement);
    exchange
}
