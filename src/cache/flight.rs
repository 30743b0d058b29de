//! In-Flight Fetch Registry
//!
//! Tracks at most one outstanding upstream fetch per key. Callers that miss the
//! cache while a fetch is registered await a clone of the same shared future
//! instead of starting their own.

use std::collections::HashMap;

use futures::future::{BoxFuture, Shared};

use crate::error::CacheError;

/// Outcome of one upstream fetch, delivered to every waiter.
pub type FlightResult<V> = Result<V, CacheError>;

/// A pending fetch that any number of callers can await.
pub type SharedFetch<V> = Shared<BoxFuture<'static, FlightResult<V>>>;

struct Flight<V> {
    id: u64,
    fetch: SharedFetch<V>,
}

// == Flight Registry ==
/// Per-key registry of pending fetches.
///
/// Every flight gets a unique id so that a fetch which was detached by an
/// invalidation can recognise, on completion, that it no longer owns the key.
pub struct FlightRegistry<V> {
    flights: HashMap<String, Flight<V>>,
    next_id: u64,
}

impl<V: Clone> FlightRegistry<V> {
    pub fn new() -> Self {
        Self {
            flights: HashMap::new(),
            next_id: 0,
        }
    }

    /// Returns the pending fetch for `key`, if any.
    pub fn join(&self, key: &str) -> Option<SharedFetch<V>> {
        self.flights.get(key).map(|flight| flight.fetch.clone())
    }

    /// Reserves the id for the next flight.
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Registers `fetch` as the pending fetch for `key`.
    pub fn insert(&mut self, key: impl Into<String>, id: u64, fetch: SharedFetch<V>) {
        self.flights.insert(key.into(), Flight { id, fetch });
    }

    /// Deregisters flight `id` for `key`.
    ///
    /// Returns false when the flight had already been detached, in which case
    /// whatever is now registered for `key` is left alone.
    pub fn complete(&mut self, key: &str, id: u64) -> bool {
        match self.flights.get(key) {
            Some(flight) if flight.id == id => {
                self.flights.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Detaches the pending fetch for `key` so later callers start a new one.
    pub fn detach(&mut self, key: &str) -> bool {
        self.flights.remove(key).is_some()
    }

    /// Detaches every pending fetch whose key starts with `prefix`.
    pub fn detach_prefix(&mut self, prefix: &str) -> usize {
        let before = self.flights.len();
        self.flights.retain(|key, _| !key.starts_with(prefix));
        before - self.flights.len()
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}

impl<V: Clone> Default for FlightRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for FlightRegistry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightRegistry")
            .field("keys", &self.flights.keys().collect::<Vec<_>>())
            .field("next_id", &self.next_id)
            .finish()
    }
}
