//! JSON network definitions.
//!
//! ```json
//! {
//!   "stations": [
//!     { "name": "Nation", "lat": 48.848, "lon": 2.396, "area": 12 },
//!     { "name": "Bastille", "lat": 48.853, "lon": 2.369 }
//!   ],
//!   "lines": [
//!     { "name": "1", "stations": ["Nation", "Bastille"], "trains": 4, "capacity": 700 }
//!   ]
//! }
//! ```
//!
//! Line stops may be given by name or by index into `stations`.  Ids are
//! reassigned densely in file order.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path as FsPath;

use serde::Deserialize;

use metro_core::{GeoPoint, StationId, TrainConfig};

use crate::{Network, NetworkBuilder, NetworkError, NetworkResult};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StationDefinition {
    pub name: String,
    pub lat:  f64,
    pub lon:  f64,
    #[serde(default)]
    pub area: Option<u32>,
}

/// A stop reference inside a line definition.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StopRef {
    Index(usize),
    Name(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LineDefinition {
    pub name:     String,
    pub stations: Vec<StopRef>,
    #[serde(default = "default_trains")]
    pub trains:   u32,
    #[serde(default)]
    pub capacity: Option<u32>,
}

fn default_trains() -> u32 {
    1
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct NetworkDefinition {
    pub stations: Vec<StationDefinition>,
    #[serde(default)]
    pub lines:    Vec<LineDefinition>,
}

impl NetworkDefinition {
    pub fn from_json_reader<R: Read>(reader: R) -> NetworkResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_path(path: impl AsRef<FsPath>) -> NetworkResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    /// Resolve stop references and build the network.
    ///
    /// # Errors
    ///
    /// Duplicate station names, unknown stop names, out-of-range stop
    /// indices, and every error of [`NetworkBuilder::build`].
    pub fn into_network(self, trains: &TrainConfig) -> NetworkResult<Network> {
        let mut builder = NetworkBuilder::new();
        let mut by_name: HashMap<String, StationId> = HashMap::with_capacity(self.stations.len());

        for s in self.stations {
            if by_name.contains_key(&s.name) {
                return Err(NetworkError::Config(format!("station {:?} defined twice", s.name)));
            }
            let id = builder.add_station(s.name.clone(), GeoPoint::new(s.lat, s.lon), s.area);
            by_name.insert(s.name, id);
        }

        let n = builder.station_count();
        for line in self.lines {
            let stops = line
                .stations
                .into_iter()
                .map(|stop| match stop {
                    StopRef::Index(i) if i < n => Ok(StationId(i as u32)),
                    StopRef::Index(i) => Err(NetworkError::UnknownStation(format!("#{i}"))),
                    StopRef::Name(name) => {
                        by_name.get(&name).copied().ok_or(NetworkError::UnknownStation(name))
                    }
                })
                .collect::<NetworkResult<Vec<_>>>()?;
            builder.add_line(line.name, stops, line.trains, line.capacity);
        }

        builder.build(trains)
    }
}
