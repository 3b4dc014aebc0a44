//! Strongly typed identifier wrappers.
//!
//! Station, line and train ids are dense and 0-based after the network is
//! normalized, so `id.index()` can be used directly to index the per-station
//! and per-train `Vec`s.  Passenger ids are allocated monotonically by the
//! population store and are only ever used as map keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) = $tag:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a station in the network's station collection.
    pub struct StationId(u32) = "station";
}

typed_id! {
    /// Index of a line in the network's line collection.
    pub struct LineId(u32) = "line";
}

typed_id! {
    /// Index of a train in the simulation's train roster.
    pub struct TrainId(u32) = "train";
}

typed_id! {
    /// Passenger identifier.  Never reused within a run, including for
    /// passengers injected by attendance peaks.
    pub struct PassengerId(u64) = "passenger";
}
