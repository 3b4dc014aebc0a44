//! JSON disruption definitions.
//!
//! ```json
//! {
//!   "station_closures": [
//!     { "station": "Bastille", "start": "2024-03-04T08:00:00", "end": "2024-03-04T09:30:00" }
//!   ],
//!   "line_closures": [
//!     { "line": "1", "from": "Nation", "to": "Bastille",
//!       "start": "2024-03-04T10:00:00", "end": "2024-03-04T11:00:00" }
//!   ],
//!   "line_delays": [
//!     { "from": "Nation", "to": "Bastille", "delay_secs": 240,
//!       "start": "2024-03-04T07:00:00", "end": "2024-03-04T07:45:00" }
//!   ],
//!   "attendance_peaks": [
//!     { "station": "Chatelet", "peak": "2024-03-04T18:00:00", "size": 500, "width_minutes": 15,
//!       "start": "2024-03-04T17:00:00", "end": "2024-03-04T19:00:00" }
//!   ]
//! }
//! ```
//!
//! Stations are referenced by name or index.  An event with an unparsable
//! time, an unknown target, or an empty window is skipped with a warning;
//! the rest of the file still loads.

use std::io::Read;
use std::path::Path as FsPath;

use serde::Deserialize;
use tracing::warn;

use metro_core::{LineId, SimTime, StationId};
use metro_network::{Network, StopRef};

use crate::{
    AttendancePeak, DisruptionResult, Disruptions, LineClosure, LineDelay, Schedule,
    StationClosure,
};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StationClosureDefinition {
    pub station: StopRef,
    pub start:   String,
    pub end:     String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LineClosureDefinition {
    pub line:  String,
    pub from:  StopRef,
    pub to:    StopRef,
    pub start: String,
    pub end:   String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LineDelayDefinition {
    pub from:       StopRef,
    pub to:         StopRef,
    pub delay_secs: i64,
    pub start:      String,
    pub end:        String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AttendancePeakDefinition {
    pub station:       StopRef,
    pub peak:          String,
    pub size:          u32,
    pub width_minutes: f64,
    pub start:         String,
    pub end:           String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EventDefinitions {
    #[serde(default)]
    pub station_closures: Vec<StationClosureDefinition>,
    #[serde(default)]
    pub line_closures:    Vec<LineClosureDefinition>,
    #[serde(default)]
    pub line_delays:      Vec<LineDelayDefinition>,
    #[serde(default)]
    pub attendance_peaks: Vec<AttendancePeakDefinition>,
}

impl EventDefinitions {
    pub fn from_json_reader<R: Read>(reader: R) -> DisruptionResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_path(path: impl AsRef<FsPath>) -> DisruptionResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    /// Resolve names against `network` and build the event lists.
    pub fn into_disruptions(self, network: &Network) -> Disruptions {
        let mut out = Disruptions::new();

        for (i, d) in self.station_closures.into_iter().enumerate() {
            let resolved = schedule(&d.start, &d.end).and_then(|s| Ok((station(network, &d.station)?, s)));
            match resolved {
                Ok((station, schedule)) => out.push_station_closure(StationClosure { station, schedule }),
                Err(reason) => warn!(kind = "station_closure", index = i, %reason, "event skipped"),
            }
        }

        for (i, d) in self.line_closures.into_iter().enumerate() {
            let resolved = schedule(&d.start, &d.end).and_then(|s| {
                let line = line(network, &d.line)?;
                let from = station(network, &d.from)?;
                let to = station(network, &d.to)?;
                let l = network.line(line);
                if !l.serves(from) || !l.serves(to) {
                    return Err(format!("{from} or {to} is not on line {:?}", d.line));
                }
                Ok(LineClosure { line, from, to, schedule: s })
            });
            match resolved {
                Ok(e) => out.push_line_closure(e),
                Err(reason) => warn!(kind = "line_closure", index = i, %reason, "event skipped"),
            }
        }

        for (i, d) in self.line_delays.into_iter().enumerate() {
            let resolved = schedule(&d.start, &d.end).and_then(|s| {
                let from = station(network, &d.from)?;
                let to = station(network, &d.to)?;
                if from == to {
                    return Err(format!("delay edge {from}–{to} is a loop"));
                }
                Ok(LineDelay { from, to, delay_secs: d.delay_secs, schedule: s })
            });
            match resolved {
                Ok(e) => out.push_line_delay(e),
                Err(reason) => warn!(kind = "line_delay", index = i, %reason, "event skipped"),
            }
        }

        for (i, d) in self.attendance_peaks.into_iter().enumerate() {
            let resolved = schedule(&d.start, &d.end).and_then(|s| {
                let station = station(network, &d.station)?;
                let peak = time(&d.peak)?;
                if !(d.width_minutes > 0.0) || !d.width_minutes.is_finite() {
                    return Err(format!("width {} must be positive", d.width_minutes));
                }
                Ok(AttendancePeak::new(station, peak, d.size, d.width_minutes, s))
            });
            match resolved {
                Ok(e) => out.push_attendance_peak(e),
                Err(reason) => warn!(kind = "attendance_peak", index = i, %reason, "event skipped"),
            }
        }

        out
    }
}

// ── Resolution helpers ────────────────────────────────────────────────────────
//
// Errors are plain strings: they only ever end up in a warning.

fn time(s: &str) -> Result<SimTime, String> {
    SimTime::parse_iso(s).map_err(|e| format!("bad time {s:?}: {e}"))
}

fn schedule(start: &str, end: &str) -> Result<Schedule, String> {
    let (start, end) = (time(start)?, time(end)?);
    if end <= start {
        return Err(format!("end {end} is not after start {start}"));
    }
    Ok(Schedule::new(start, end))
}

fn station(network: &Network, r: &StopRef) -> Result<StationId, String> {
    match r {
        StopRef::Index(i) if *i < network.station_count() => Ok(StationId(*i as u32)),
        StopRef::Index(i) => Err(format!("no station #{i}")),
        StopRef::Name(n) => network.station_by_name(n).ok_or_else(|| format!("no station {n:?}")),
    }
}

fn line(network: &Network, name: &str) -> Result<LineId, String> {
    network.line_by_name(name).ok_or_else(|| format!("no line {name:?}"))
}
