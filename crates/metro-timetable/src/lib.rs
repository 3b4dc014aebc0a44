//! `metro-timetable` — trains, initial positions, and the planned timetable.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`train`]     | `Train` state and the one-hop `arrive` step               |
//! | [`movement`]  | `Movement` — one arrival/departure record                 |
//! | [`generator`] | `initial_trains`, `Timetable::generate`                   |
//! | [`error`]     | `TimetableError`, `TimetableResult<T>`                    |
//!
//! # Train model
//!
//! A train shuttles between the two termini of its line.  It is always
//! between two stops: `current`, where it last arrived, and `next`, where it
//! arrives at `arrival_next`.  Arriving at a terminus reverses the direction
//! and increments the trip number.
//!
//! ```text
//!   cycle position:  0   1   2 | 3   4   5      (line of 4 stops, 2·(4-1) = 6)
//!   stop index:      0 → 1 → 2 | 3 → 2 → 1 → 0
//!   direction:       up          down
//! ```
//!
//! Initial trains of a line are spread evenly over the cycle.

pub mod error;
pub mod generator;
pub mod movement;
pub mod train;


pub use error::{TimetableError, TimetableResult};
pub use generator::{Timetable, initial_trains};
pub use movement::Movement;
pub use train::{Train, next_stop};
