//! small — a morning on a ten-station metro.
//!
//! Loads `data/config.json`, `data/network.json` and `data/events.json`
//! (or the same three files from the directory given as the first
//! argument), runs one day type (second argument, default `weekday`) and
//! writes CSV output to `output/small`.
//!
//! ```text
//! RUST_LOG=metro_disruption=debug cargo run -p small -- demos/small/data saturday
//! ```

mod logger;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use metro_core::{DayType, SimConfig, SimTime};
use metro_disruption::EventDefinitions;
use metro_network::NetworkDefinition;
use metro_output::{CsvWriter, OutputWriter, SimOutputObserver};
use metro_population::{PopulationStore, Transfer};
use metro_sim::{RunSummary, SimBuilder, SimObserver, TickStats};
use metro_timetable::Movement;

use logger::init_logger;

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");
const DEFAULT_DAY_TYPE: &str = "weekday";
const OUTPUT_DIR:       &str = "output/small";
/// Run to the configured end time.
const TICK_BUDGET:      i64  = 0;

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:           SimOutputObserver<W>,
    movement_rows:   usize,
    transfer_rows:   usize,
    summary_rows:    usize,
    disrupted_ticks: usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, movement_rows: 0, transfer_rows: 0, summary_rows: 0, disrupted_ticks: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_run_start(&mut self, day_type: DayType, start: SimTime) {
        self.inner.on_run_start(day_type, start);
    }

    fn on_movements(&mut self, movements: &[Movement]) {
        self.movement_rows += movements.len();
        self.inner.on_movements(movements);
    }

    fn on_transfers(&mut self, transfers: &[Transfer]) {
        self.transfer_rows += transfers.len();
        self.inner.on_transfers(transfers);
    }

    fn on_tick_end(&mut self, stats: &TickStats) {
        self.summary_rows += 1;
        let d = &stats.disruption;
        if d.started + d.ended + d.injected > 0 {
            self.disrupted_ticks += 1;
        }
        self.inner.on_tick_end(stats);
    }

    fn on_sim_end(&mut self, summary: &RunSummary, store: &PopulationStore) {
        self.inner.on_sim_end(summary, store);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logger()?;

    let mut args = std::env::args().skip(1);
    let data_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let day_type = args.next().unwrap_or_else(|| DEFAULT_DAY_TYPE.to_owned());

    println!("=== small — metro passenger traffic ===");
    println!("Data: {}  |  Day type: {day_type}", data_dir.display());
    println!();

    // 1. Configuration.
    let config = SimConfig::from_json_path(&data_dir.join("config.json"))
        .context("loading config.json")?;
    println!(
        "Window: {} → {}  |  Seed: {}  |  Passengers: {}",
        config.start, config.end, config.seed, config.population.size
    );

    // 2. Network.
    let network = NetworkDefinition::from_json_path(data_dir.join("network.json"))
        .context("loading network.json")?
        .into_network(&config.trains)?;
    println!("Network: {} stations, {} lines", network.station_count(), network.lines().len());

    // 3. Disruptions.
    let disruptions = EventDefinitions::from_json_path(data_dir.join("events.json"))
        .context("loading events.json")?
        .into_disruptions(&network);
    println!(
        "Events: {} closures, {} line closures, {} delays, {} peaks",
        disruptions.station_closures().len(),
        disruptions.line_closures().len(),
        disruptions.line_delays().len(),
        disruptions.attendance_peaks().len(),
    );
    println!();

    // 4. Build sim (population generated from the config).
    let mut sim = SimBuilder::new(config, network).disruptions(disruptions).build()?;
    println!(
        "Timetable: {} planned stops for {} trains",
        sim.timetable().len(),
        sim.timetable().train_count()
    );

    // 5. Set up output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let n = CsvWriter::write_timetable(&Path::new(OUTPUT_DIR).join("timetable.csv"), sim.timetable())?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer));

    // 6. Run.
    let t0 = Instant::now();
    let summary = sim.run_with(&day_type, TICK_BUDGET, &mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 7. Summary.
    println!("Simulation complete in {:.3} s ({} ticks)", elapsed.as_secs_f64(), summary.ticks);
    println!("  timetable.csv       : {n} rows");
    println!("  movements.csv       : {} rows", obs.movement_rows);
    println!("  transfers.csv       : {} rows", obs.transfer_rows);
    println!("  tick_summaries.csv  : {} rows", obs.summary_rows);
    println!("  ticks with events   : {}", obs.disrupted_ticks);
    println!();

    // 8. Trip outcomes.
    let trips = summary.trips;
    println!("{:<12} {:>8}", "Trips", "Count");
    println!("{}", "-".repeat(21));
    println!("{:<12} {:>8}", "completed", trips.completed);
    println!("{:<12} {:>8}", "abandoned", trips.abandoned);
    println!("{:<12} {:>8}", "ongoing", trips.ongoing);
    println!("{:<12} {:>8}", "pending", trips.pending);
    println!("{:<12} {:>8}", "injected", summary.injected);
    println!();

    // 9. Stops per line.
    println!("{:<6} {:>8} {:>8}", "Line", "Stops", "Revenue");
    println!("{}", "-".repeat(24));
    for line in sim.network().lines() {
        let (stops, revenue) = sim
            .movements()
            .iter()
            .filter(|m| m.line == line.id)
            .fold((0usize, 0usize), |(s, r), m| (s + 1, r + m.revenue as usize));
        println!("{:<6} {:>8} {:>8}", line.name, stops, revenue);
    }

    Ok(())
}
