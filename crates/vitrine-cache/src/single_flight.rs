//! In-flight request deduplication.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

type Flight<T> = Shared<BoxFuture<'static, T>>;

/// Deduplicates concurrent async work by key.
///
/// The first caller for a key starts the work; callers arriving while it is
/// in flight await the same future and get a clone of its output. The entry
/// is removed once the work completes, so the next call starts fresh.
pub struct SingleFlight<K, T: Clone> {
  flights: Mutex<HashMap<K, Flight<T>>>,
}

impl<K, T> SingleFlight<K, T>
where
  K: Eq + Hash + Clone + Send,
  T: Clone + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flights: Mutex::new(HashMap::new()),
    }
  }

  /// Run `start()` for `key` unless a flight for `key` is already running,
  /// in which case join it.
  pub async fn run<F>(&self, key: K, start: F) -> T
  where
    F: FnOnce() -> BoxFuture<'static, T> + Send,
  {
    let flight = {
      let mut flights = self.lock();
      flights
        .entry(key.clone())
        .or_insert_with(|| start().shared())
        .clone()
    };

    let output = flight.clone().await;

    let mut flights = self.lock();
    if flights
      .get(&key)
      .is_some_and(|current| Shared::ptr_eq(current, &flight))
    {
      flights.remove(&key);
    }

    output
  }

  /// Number of keys with work currently in flight.
  pub fn in_flight(&self) -> usize {
    self.lock().len()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<K, Flight<T>>> {
    self.flights.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<K, T> Default for SingleFlight<K, T>
where
  K: Eq + Hash + Clone + Send,
  T: Clone + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
