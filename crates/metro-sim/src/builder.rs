//! Fluent builder for constructing a [`Simulation`].

use tracing::info;

use metro_core::{SimConfig, SimRng};
use metro_disruption::Disruptions;
use metro_network::Network;
use metro_population::{Passenger, PopulationStore, generate_population};
use metro_timetable::{Timetable, initial_trains};

use crate::{SimError, SimResult, Simulation};

/// RNG stream offsets, one per concern.
const POPULATION_STREAM: u64 = 1;
const DISRUPTION_STREAM: u64 = 2;

/// Fluent builder for [`Simulation`].
///
/// # Required inputs
///
/// - [`SimConfig`]: time span, seed, train physics, population sizing
/// - [`Network`]: stations and lines, from a `NetworkBuilder` or a loader
///
/// # Optional inputs (have defaults)
///
/// | Method             | Default                                        |
/// |--------------------|------------------------------------------------|
/// | `.disruptions(d)`  | No events                                      |
/// | `.passengers(v)`   | `generate_population` with the config's sizing |
///
/// # Example
///
/// ```rust,ignore
/// let network = NetworkDefinition::from_json_path("network.json")?.into_network(&config.trains)?;
/// let events = EventDefinitions::from_json_path("events.json")?.into_disruptions(&network);
/// let mut sim = SimBuilder::new(config, network).disruptions(events).build()?;
/// let summary = sim.run("weekday", 0)?;
/// ```
pub struct SimBuilder {
    config:      SimConfig,
    network:     Network,
    disruptions: Disruptions,
    passengers:  Option<Vec<Passenger>>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, network: Network) -> Self {
        Self {
            config,
            network,
            disruptions: Disruptions::new(),
            passengers:  None,
        }
    }

    pub fn disruptions(mut self, disruptions: Disruptions) -> Self {
        self.disruptions = disruptions;
        self
    }

    /// Use these passengers instead of generating a population.
    ///
    /// Every passenger starts outside; ids must be unique.
    pub fn passengers(mut self, passengers: Vec<Passenger>) -> Self {
        self.passengers = Some(passengers);
        self
    }

    /// Validate the configuration, place the trains, plan the timetable and
    /// fill the population store.
    pub fn build(self) -> SimResult<Simulation> {
        self.config.validate()?;
        if self.network.station_count() < 2 {
            return Err(SimError::Config("the network needs at least two stations".into()));
        }

        let mut rng = SimRng::new(self.config.seed);
        let start = self.config.start_time();

        let trains = initial_trains(&self.network, &self.config.trains, start);
        let timetable = Timetable::generate(&self.network, &trains, &self.config)?;

        let passengers = match self.passengers {
            Some(p) => p,
            None => {
                let mut population_rng = rng.child(POPULATION_STREAM);
                generate_population(&self.network, &self.config, &mut population_rng)?
            }
        };
        let store = PopulationStore::with_passengers(self.network.station_count(), trains.len(), passengers)?;

        info!(
            stations    = self.network.station_count(),
            lines       = self.network.lines().len(),
            trains      = trains.len(),
            passengers  = store.total(),
            disruptions = self.disruptions.len(),
            planned     = timetable.len(),
            "simulation built"
        );

        Ok(Simulation {
            now:         start,
            ticks:       0,
            rng:         rng.child(DISRUPTION_STREAM),
            config:      self.config,
            network:     self.network,
            timetable,
            trains,
            store,
            disruptions: self.disruptions,
            movements:   Vec::new(),
            transfers:   Vec::new(),
        })
    }
}
