//! Shared helpers for library integration tests.

use std::sync::Arc;

use stowage_lib::{Codec, ExecutionContextConfig, LocalStore, MemoryCache};
use tempfile::TempDir;

/// Isolated store rooted in a temp directory.
pub struct TestStore {
  pub temp: TempDir,
  pub store: Arc<LocalStore>,
}

impl TestStore {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(LocalStore::open(temp.path().join("store")).unwrap());
    Self { temp, store }
  }

  /// Context without a cache.
  pub fn uncached(&self, codec: Codec) -> ExecutionContextConfig {
    ExecutionContextConfig::new(self.store.clone(), codec, "jobs")
  }

  /// Context with a fresh, empty cache.
  pub fn cached(&self, codec: Codec) -> ExecutionContextConfig {
    self.uncached(codec).with_cache(Arc::new(MemoryCache::new()))
  }
}
