//! The four disruption kinds.

use metro_core::{LineId, SimTime, StationId};

use crate::{Schedule, peak::RateCurve};

/// A station is closed for the duration of the event.
#[derive(Clone, Debug, PartialEq)]
pub struct StationClosure {
    pub station:  StationId,
    pub schedule: Schedule,
}

/// Every hop of `line` between `from` and `to` is closed.
#[derive(Clone, Debug, PartialEq)]
pub struct LineClosure {
    pub line:     LineId,
    pub from:     StationId,
    pub to:       StationId,
    pub schedule: Schedule,
}

/// Extra running time on the edge `from`–`to`, both directions.
#[derive(Clone, Debug, PartialEq)]
pub struct LineDelay {
    pub from:       StationId,
    pub to:         StationId,
    pub delay_secs: i64,
    pub schedule:   Schedule,
}

/// A burst of extra passengers entering `station` around `peak`.
#[derive(Clone, Debug, PartialEq)]
pub struct AttendancePeak {
    pub station:       StationId,
    pub peak:          SimTime,
    pub size:          u32,
    pub width_minutes: f64,
    pub schedule:      Schedule,
    rates:             RateCurve,
    /// Minutes of the curve already injected.
    cursor:            usize,
}

impl AttendancePeak {
    pub fn new(station: StationId, peak: SimTime, size: u32, width_minutes: f64, schedule: Schedule) -> Self {
        let rates = RateCurve::gaussian(schedule.window, peak, size, width_minutes);
        Self { station, peak, size, width_minutes, schedule, rates, cursor: 0 }
    }

    #[inline]
    pub fn rates(&self) -> &RateCurve {
        &self.rates
    }

    /// Passengers injected so far.
    pub fn injected(&self) -> u32 {
        self.rates.sum_range(0, self.cursor)
    }

    /// Passengers due by `new_time` that were not injected yet.
    ///
    /// Once the event has finished the whole curve is due.
    pub(crate) fn take_due(&mut self, new_time: SimTime) -> u32 {
        let upto = if self.schedule.end() <= new_time {
            self.rates.len()
        } else {
            new_time
                .minutes_since(self.schedule.start())
                .clamp(0, self.rates.len() as i64) as usize
        };
        if upto <= self.cursor {
            return 0;
        }
        let due = self.rates.sum_range(self.cursor, upto);
        self.cursor = upto;
        due
    }
}
