//! Process-local, untyped cache capability.
//!
//! Entries are keyed by a reference's uuid and hold the deserialized value
//! behind `Arc<dyn Any>`. Callers downcast on read. No eviction is performed
//! here.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A cached, type-erased value.
pub type CacheValue = Arc<dyn Any + Send + Sync>;

pub trait Cache: Send + Sync + fmt::Debug {
  fn try_find(&self, key: &str) -> Option<CacheValue>;

  fn contains_key(&self, key: &str) -> bool;

  /// Adds `value` under `key`. Returns `false` if the key was already present.
  fn add(&self, key: String, value: CacheValue) -> bool;

  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// In-memory cache shared by every reference in the process.
#[derive(Default)]
pub struct MemoryCache {
  entries: RwLock<HashMap<String, CacheValue>>,
}

impl MemoryCache {
  pub fn new() -> Self {
    Self::default()
  }
}

impl fmt::Debug for MemoryCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoryCache").field("len", &self.len()).finish()
  }
}

impl Cache for MemoryCache {
  fn try_find(&self, key: &str) -> Option<CacheValue> {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    entries.get(key).cloned()
  }

  fn contains_key(&self, key: &str) -> bool {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    entries.contains_key(key)
  }

  fn add(&self, key: String, value: CacheValue) -> bool {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    if entries.contains_key(&key) {
      return false;
    }
    entries.insert(key, value);
    true
  }

  fn len(&self) -> usize {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    entries.len()
  }
}
