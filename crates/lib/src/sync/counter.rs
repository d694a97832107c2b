use std::sync::atomic::{AtomicI64, Ordering};

/// A shared integer with atomic increment.
///
/// Used to mint sequence numbers and to count completions across workers.
#[derive(Debug, Default)]
pub struct AtomicCounter {
  value: AtomicI64,
}

impl AtomicCounter {
  pub fn new(initial: i64) -> Self {
    Self {
      value: AtomicI64::new(initial),
    }
  }

  /// Adds one and returns the value after the increment.
  pub fn increment(&self) -> i64 {
    self.value.fetch_add(1, Ordering::SeqCst) + 1
  }

  /// The most recent value written by any thread.
  pub fn value(&self) -> i64 {
    self.value.load(Ordering::SeqCst)
  }
}
