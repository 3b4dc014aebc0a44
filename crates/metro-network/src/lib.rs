//! `metro-network` — stations, lines, paths, and the all-pairs path graph.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`station`] | `Station`, `StationStatus`                                  |
//! | [`line`]    | `Line`, `Direction`                                         |
//! | [`path`]    | `Path` — immutable station sequence with per-hop lines      |
//! | [`graph`]   | `Graph` (transfer closure), `TravelTimes`, `DelayMatrix`    |
//! | [`network`] | `Network` (owns everything + R-tree), `NetworkBuilder`      |
//! | [`routing`] | graph lookup with nearest-reachable fallback, `Route`       |
//! | [`loader`]  | JSON network definition → `Network`                         |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Rebuild model
//!
//! The graph is a dense N×N matrix of `Option<Path>`.  It is rebuilt from
//! scratch every time a station or a line span changes status; the travel
//! time matrix never changes and the delay matrix survives rebuilds.

pub mod error;
pub mod graph;
pub mod line;
pub mod loader;
pub mod network;
pub mod path;
pub mod routing;
pub mod station;


pub use error::{NetworkError, NetworkResult};
pub use graph::{DelayMatrix, Graph, TravelTimes, travel_secs};
pub use line::{Direction, Line};
pub use loader::{LineDefinition, NetworkDefinition, StationDefinition, StopRef};
pub use network::{Network, NetworkBuilder};
pub use path::Path;
pub use routing::Route;
pub use station::{Station, StationStatus};
