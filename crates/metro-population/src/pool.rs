//! Per-station and per-train passenger pools.
//!
//! Each pool is an independent `Mutex`, so train tasks running in parallel
//! only contend when they touch the same station.  Callers that need a
//! station and a train at once lock the station first.

use std::sync::{Mutex, MutexGuard, PoisonError};

use metro_core::{PassengerId, StationId, TrainId};

use crate::Passenger;

#[cfg(feature = "fx-hash")]
pub type PassengerMap = rustc_hash::FxHashMap<PassengerId, Passenger>;
#[cfg(not(feature = "fx-hash"))]
pub type PassengerMap = std::collections::HashMap<PassengerId, Passenger>;

/// A fixed set of independently locked passenger maps.
pub struct Pools {
    inner: Vec<Mutex<PassengerMap>>,
}

impl Pools {
    pub fn new(count: usize) -> Self {
        Self { inner: (0..count).map(|_| Mutex::new(PassengerMap::default())).collect() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Lock pool `index` for the lifetime of the guard.
    ///
    /// A poisoned lock is recovered: pool contents are plain data and are
    /// consistent between any two statements of the owning thread.
    pub fn lock(&self, index: usize) -> MutexGuard<'_, PassengerMap> {
        self.inner[index].lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of passengers across all pools.
    pub fn total(&self) -> usize {
        (0..self.inner.len()).map(|i| self.lock(i).len()).sum()
    }

    /// Index of the pool holding `id`.
    pub fn find(&self, id: PassengerId) -> Option<usize> {
        (0..self.inner.len()).find(|&i| self.lock(i).contains_key(&id))
    }

    /// Exclusive access to every map, for single-threaded phases.
    pub fn maps_mut(&mut self) -> impl Iterator<Item = &mut PassengerMap> {
        self.inner
            .iter_mut()
            .map(|m| m.get_mut().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Waiting passengers, one pool per station.
pub struct StationPools(pub(crate) Pools);

impl StationPools {
    #[inline]
    pub fn lock(&self, station: StationId) -> MutexGuard<'_, PassengerMap> {
        self.0.lock(station.index())
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.0.total()
    }

    pub fn get_mut(&mut self, station: StationId) -> &mut PassengerMap {
        self.0.inner[station.index()].get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Riding passengers, one pool per train.
pub struct TrainPools(pub(crate) Pools);

impl TrainPools {
    #[inline]
    pub fn lock(&self, train: TrainId) -> MutexGuard<'_, PassengerMap> {
        self.0.lock(train.index())
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.0.total()
    }

    pub fn get_mut(&mut self, train: TrainId) -> &mut PassengerMap {
        self.0.inner[train.index()].get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}
