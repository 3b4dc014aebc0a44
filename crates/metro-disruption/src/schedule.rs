//! The lifecycle shared by every disruption event.
//!
//! ```text
//!   Scheduled ──start ≤ t──▶ Active ──end ≤ t──▶ Finished
//! ```
//!
//! Only the simulation loop advances an event, once per tick, with the
//! tick's `new_time`.  Both transitions can happen in the same tick.

use metro_core::{SimTime, TimeWindow};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    #[default]
    Scheduled,
    Active,
    Finished,
}

/// What one call to [`Schedule::advance`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    pub started: bool,
    pub ended:   bool,
}

impl Transition {
    #[inline]
    pub fn is_none(self) -> bool {
        !self.started && !self.ended
    }
}

/// When an event applies and where it is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub window: TimeWindow,
    state:      Lifecycle,
}

impl Schedule {
    pub fn new(start: SimTime, end: SimTime) -> Self {
        Self { window: TimeWindow::new(start, end), state: Lifecycle::Scheduled }
    }

    #[inline]
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == Lifecycle::Active
    }

    #[inline]
    pub fn start(&self) -> SimTime {
        self.window.start
    }

    #[inline]
    pub fn end(&self) -> SimTime {
        self.window.end
    }

    /// Fire every transition due by `new_time`.
    pub fn advance(&mut self, new_time: SimTime) -> Transition {
        let mut t = Transition::default();
        if self.state == Lifecycle::Scheduled && self.window.start <= new_time {
            self.state = Lifecycle::Active;
            t.started = true;
        }
        if self.state == Lifecycle::Active && self.window.end <= new_time {
            self.state = Lifecycle::Finished;
            t.ended = true;
        }
        t
    }
}
