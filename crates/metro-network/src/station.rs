//! Stations.

use metro_core::{GeoPoint, LineId, StationId};

/// Whether passengers may enter, leave, or change trains at a station.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum StationStatus {
    #[default]
    Open,
    Closed,
}

/// A stop on one or more lines.
///
/// `id` always equals the station's index in [`Network::stations`][crate::Network::stations].
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    pub id:       StationId,
    pub name:     String,
    pub position: GeoPoint,
    pub status:   StationStatus,
    /// Demand-modelling area, if the definition provides one.
    pub area:     Option<u32>,
    /// Lines serving this station, ascending.  Filled in by the builder.
    pub lines:    Vec<LineId>,
}

impl Station {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == StationStatus::Open
    }

    /// `true` if more than one line serves the station.
    #[inline]
    pub fn is_interchange(&self) -> bool {
        self.lines.len() > 1
    }
}
