//! The capabilities in effect for an execution context.

use std::sync::Arc;

use crate::cache::Cache;
use crate::serializer::Codec;
use crate::store::{Store, TableStore};

/// Immutable bundle of store, serializer, cache, and defaults.
///
/// Built once (by [`crate::bootstrap::RuntimeBootstrap`] or by hand) and passed
/// explicitly to every reference operation. Cloning shares the capabilities.
#[derive(Debug, Clone)]
pub struct ExecutionContextConfig {
  store: Arc<dyn Store>,
  table_store: Option<Arc<dyn TableStore>>,
  serializer: Codec,
  cache: Option<Arc<dyn Cache>>,
  default_directory: String,
}

impl ExecutionContextConfig {
  pub fn new(store: Arc<dyn Store>, serializer: Codec, default_directory: impl Into<String>) -> Self {
    Self {
      store,
      table_store: None,
      serializer,
      cache: None,
      default_directory: default_directory.into(),
    }
  }

  pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
    self.cache = Some(cache);
    self
  }

  pub fn with_table_store(mut self, table_store: Arc<dyn TableStore>) -> Self {
    self.table_store = Some(table_store);
    self
  }

  pub fn store(&self) -> &dyn Store {
    self.store.as_ref()
  }

  pub fn table_store(&self) -> Option<&dyn TableStore> {
    self.table_store.as_deref()
  }

  pub fn serializer(&self) -> Codec {
    self.serializer
  }

  pub fn cache(&self) -> Option<&dyn Cache> {
    self.cache.as_deref()
  }

  pub fn default_directory(&self) -> &str {
    &self.default_directory
  }
}
