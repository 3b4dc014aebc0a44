//! Scalar simulation configuration.
//!
//! A single immutable [`SimConfig`] is built once (usually from JSON via
//! [`SimConfig::from_json_reader`]), validated, and then passed by reference
//! to the graph builder, the simulation loop and the disruption engine.
//! Nothing in the workspace keeps configuration in global state.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, SimTime, TimeWindow};

/// Maximum distance of a proportion set's sum from 1.
pub const PROPORTION_TOLERANCE: f64 = 1e-6;

// ── Sections ──────────────────────────────────────────────────────────────────

/// Share of each passenger kind in the generated population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KindProportions {
    pub adult:    f64,
    pub student:  f64,
    pub disabled: f64,
    pub child:    f64,
    pub senior:   f64,
}

impl KindProportions {
    /// Weights in [`PassengerKind::ALL`][crate::PassengerKind::ALL] order.
    pub fn weights(&self) -> [f64; 5] {
        [self.adult, self.student, self.disabled, self.child, self.senior]
    }
}

impl Default for KindProportions {
    fn default() -> Self {
        Self { adult: 0.6, student: 0.15, disabled: 0.05, child: 0.1, senior: 0.1 }
    }
}

/// Share of each trip pattern in the generated population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripPatternProportions {
    pub one_way:    f64,
    pub round_trip: f64,
    pub chain:      f64,
}

impl TripPatternProportions {
    /// Weights in [`TripPattern::ALL`][crate::TripPattern::ALL] order.
    pub fn weights(&self) -> [f64; 3] {
        [self.one_way, self.round_trip, self.chain]
    }
}

impl Default for TripPatternProportions {
    fn default() -> Self {
        Self { one_way: 0.3, round_trip: 0.6, chain: 0.1 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of passengers generated before the run.
    pub size: usize,
    #[serde(default)]
    pub kinds: KindProportions,
    #[serde(default)]
    pub trip_patterns: TripPatternProportions,
}

/// Rolling-stock physics and station behaviour shared by every train.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Constant acceleration (and braking), m/s².
    pub acceleration_mps2: f64,
    /// Top speed, m/s.
    pub max_speed_mps: f64,
    /// Dwell time at every open station, seconds.
    pub time_in_station_secs: i64,
    /// Capacity used by lines that do not set their own.
    pub default_capacity: u32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            acceleration_mps2:    1.1,
            max_speed_mps:        22.0,
            time_in_station_secs: 30,
            default_capacity:     600,
        }
    }
}

/// Time-of-day window of normal service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessDay {
    pub start: NaiveTime,
    pub end:   NaiveTime,
}

impl BusinessDay {
    /// The window on the calendar day containing `day`.
    pub fn window_on(&self, day: SimTime) -> TimeWindow {
        let midnight = day.day_start();
        TimeWindow::new(
            midnight.offset(self.start.num_seconds_from_midnight() as i64),
            midnight.offset(self.end.num_seconds_from_midnight() as i64),
        )
    }

    /// `true` if the time of day of `t` is inside the window.
    pub fn contains(&self, t: SimTime) -> bool {
        self.window_on(t).contains(t)
    }
}

impl Default for BusinessDay {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            end:   NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
        }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// First simulated instant.
    pub start: NaiveDateTime,

    /// Last simulated instant (the loop stops once it is reached).
    pub end: NaiveDateTime,

    #[serde(default)]
    pub business_day: BusinessDay,

    pub population: PopulationConfig,

    #[serde(default)]
    pub trains: TrainConfig,

    /// A passenger waiting in a station longer than this is flushed outside.
    pub max_wait_in_station_secs: i64,

    /// Per-tick debug logging.
    #[serde(default)]
    pub debug: bool,
}

impl SimConfig {
    /// Default sections, an empty population and a one-hour maximum wait.
    pub fn new(seed: u64, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            seed,
            start,
            end,
            business_day: BusinessDay::default(),
            population: PopulationConfig {
                size:          0,
                kinds:         KindProportions::default(),
                trip_patterns: TripPatternProportions::default(),
            },
            trains: TrainConfig::default(),
            max_wait_in_station_secs: 3600,
            debug: false,
        }
    }

    /// Read and validate a configuration from JSON.
    pub fn from_json_reader<R: Read>(reader: R) -> CoreResult<Self> {
        let config: SimConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`from_json_reader`](Self::from_json_reader) for a file path.
    pub fn from_json_path(path: &Path) -> CoreResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    #[inline]
    pub fn start_time(&self) -> SimTime {
        SimTime::from_naive(self.start)
    }

    #[inline]
    pub fn end_time(&self) -> SimTime {
        SimTime::from_naive(self.end)
    }

    /// Check every invariant the simulation relies on.
    ///
    /// Any failure here is a fatal configuration error: the run must not
    /// start.
    pub fn validate(&self) -> CoreResult<()> {
        check_proportions("passenger kind", &self.population.kinds.weights())?;
        check_proportions("trip pattern", &self.population.trip_patterns.weights())?;

        if self.end_time() <= self.start_time() {
            return Err(CoreError::Config(format!(
                "end {} is not after start {}",
                self.end, self.start
            )));
        }
        if self.business_day.end <= self.business_day.start {
            return Err(CoreError::Config(format!(
                "business day end {} is not after its start {}",
                self.business_day.end, self.business_day.start
            )));
        }
        let trains = &self.trains;
        if !(trains.acceleration_mps2 > 0.0) || !(trains.max_speed_mps > 0.0) {
            return Err(CoreError::Config(
                "train acceleration and max speed must be positive".into(),
            ));
        }
        if trains.time_in_station_secs < 0 || self.max_wait_in_station_secs < 0 {
            return Err(CoreError::Config("durations must not be negative".into()));
        }
        Ok(())
    }
}

fn check_proportions(what: &str, weights: &[f64]) -> CoreResult<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(CoreError::Config(format!("{what} proportions must be finite and non-negative")));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > PROPORTION_TOLERANCE {
        return Err(CoreError::Config(format!("{what} proportions sum to {sum}, expected 1")));
    }
    Ok(())
}

// ── DayType ───────────────────────────────────────────────────────────────────

/// Label of the simulated day, passed to `run` and echoed into reports.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Saturday,
    Sunday,
    Holiday,
}

impl DayType {
    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Weekday  => "weekday",
            DayType::Saturday => "saturday",
            DayType::Sunday   => "sunday",
            DayType::Holiday  => "holiday",
        }
    }
}

impl FromStr for DayType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekday" | "week" => Ok(DayType::Weekday),
            "saturday" | "sat" => Ok(DayType::Saturday),
            "sunday" | "sun"   => Ok(DayType::Sunday),
            "holiday"          => Ok(DayType::Holiday),
            other => Err(CoreError::Parse(format!("unknown day type {other:?}"))),
        }
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
