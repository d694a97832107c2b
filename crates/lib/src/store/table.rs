//! Optional keyed table storage.
//!
//! A context may carry a table store next to its blob store. Nothing in the
//! reference machinery requires one; callers check for it before use.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableStoreError {
  #[error("table name must not be empty")]
  EmptyTable,

  #[error("row key must not be empty")]
  EmptyKey,
}

/// Rows of bytes addressed by `(table, key)`.
pub trait TableStore: Send + Sync + fmt::Debug {
  /// Inserts a row. Returns `false` and leaves the row untouched if the key exists.
  fn insert(&self, table: &str, key: &str, row: Vec<u8>) -> Result<bool, TableStoreError>;

  fn get(&self, table: &str, key: &str) -> Result<Option<Vec<u8>>, TableStoreError>;

  /// Returns whether a row was removed.
  fn remove(&self, table: &str, key: &str) -> Result<bool, TableStoreError>;
}

/// Process-local table store.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
  tables: Mutex<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl MemoryTableStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn validate(table: &str, key: &str) -> Result<(), TableStoreError> {
    if table.is_empty() {
      return Err(TableStoreError::EmptyTable);
    }
    if key.is_empty() {
      return Err(TableStoreError::EmptyKey);
    }
    Ok(())
  }
}

impl TableStore for MemoryTableStore {
  fn insert(&self, table: &str, key: &str, row: Vec<u8>) -> Result<bool, TableStoreError> {
    Self::validate(table, key)?;
    let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
    let rows = tables.entry(table.to_string()).or_default();
    if rows.contains_key(key) {
      return Ok(false);
    }
    rows.insert(key.to_string(), row);
    Ok(true)
  }

  fn get(&self, table: &str, key: &str) -> Result<Option<Vec<u8>>, TableStoreError> {
    Self::validate(table, key)?;
    let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
    Ok(tables.get(table).and_then(|rows| rows.get(key)).cloned())
  }

  fn remove(&self, table: &str, key: &str) -> Result<bool, TableStoreError> {
    Self::validate(table, key)?;
    let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
    Ok(tables.get_mut(table).is_some_and(|rows| rows.remove(key).is_some()))
  }
}
