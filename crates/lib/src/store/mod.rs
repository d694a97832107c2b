//! Store capability for stowage.
//!
//! The store is byte-stream persistence keyed by a store-relative path. It is
//! consumed through the [`Store`] trait so references never depend on a
//! particular backend.
//!
//! # Layout
//!
//! ```text
//! <root>/
//! ├── <container>/            # One directory per container
//! │   └── <file>              # Serialized payload, written once
//! └── container-<uuid>/       # Containers minted by create_unique_container_name
//! ```

pub mod local;
pub mod table;

use std::fmt;
use std::future::Future;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use local::LocalStore;
pub use table::{MemoryTableStore, TableStore, TableStoreError};

/// Store operation future type alias.
pub type StoreFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Writer callback handed to [`Store::write`].
///
/// The store owns the stream: it runs the callback once, flushes, and closes
/// the stream whether or not the callback succeeds. Backends may run it off the
/// async scheduler, so it owns everything it writes.
pub type StoreWriter = Box<dyn FnOnce(&mut dyn Write) -> io::Result<()> + Send + 'static>;

/// Readable payload stream returned by [`Store::begin_read`].
pub type StoreReader = Box<dyn Read + Send>;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
  /// No payload exists at the path.
  #[error("no stored object at {0}")]
  NotFound(StorePath),

  /// The path is not a valid store-relative path.
  #[error("invalid store path {path:?}: {reason}")]
  InvalidPath { path: String, reason: &'static str },

  /// Writing the payload failed; nothing was published at the path.
  #[error("failed to write {path}: {source}")]
  Write {
    path: StorePath,
    #[source]
    source: io::Error,
  },

  /// Any other I/O failure.
  #[error("store i/o error at {path}: {source}")]
  Io {
    path: StorePath,
    #[source]
    source: io::Error,
  },

  /// The store root could not be prepared.
  #[error("failed to create store directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl StoreError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, StoreError::NotFound(_))
  }
}

/// A store-relative location: `/`-separated, never absolute, no `..`.
///
/// This is the store-level identity of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorePath(String);

impl StorePath {
  pub fn new(path: impl Into<String>) -> Result<Self, StoreError> {
    let path = path.into();
    let invalid = |reason| StoreError::InvalidPath {
      path: path.clone(),
      reason,
    };

    if path.is_empty() {
      return Err(invalid("path is empty"));
    }
    if path.starts_with('/') || path.starts_with('\\') {
      return Err(invalid("path must be relative to the store root"));
    }
    if path.split('/').any(|segment| segment.is_empty()) {
      return Err(invalid("path contains an empty segment"));
    }
    if path.split('/').any(|segment| segment == "." || segment == "..") {
      return Err(invalid("path contains a relative segment"));
    }
    if path.contains('\\') {
      return Err(invalid("path must use '/' separators"));
    }

    Ok(Self(path))
  }

  /// Joins a container (directory) and a file name.
  pub fn join(container: &str, file: &str) -> Result<Self, StoreError> {
    if container.is_empty() {
      return Self::new(file);
    }
    Self::new(format!("{}/{}", container.trim_end_matches('/'), file))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Everything before the last segment, or `None` for a top-level file.
  pub fn container(&self) -> Option<&str> {
    self.0.rsplit_once('/').map(|(container, _)| container)
  }

  pub fn file_name(&self) -> &str {
    self.0.rsplit_once('/').map_or(self.0.as_str(), |(_, file)| file)
  }

  pub(crate) fn segments(&self) -> impl Iterator<Item = &str> {
    self.0.split('/')
  }
}

impl fmt::Display for StorePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl TryFrom<String> for StorePath {
  type Error = StoreError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<StorePath> for String {
  fn from(path: StorePath) -> Self {
    path.0
  }
}

impl std::str::FromStr for StorePath {
  type Err = StoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::new(s)
  }
}

/// Byte-stream persistence keyed by [`StorePath`].
///
/// Implementations must be safe to share across tasks. Every fallible
/// operation propagates its failure unchanged; callers perform no retry.
pub trait Store: Send + Sync + fmt::Debug {
  /// Opens the payload at `path` for reading.
  fn begin_read<'a>(&'a self, path: &'a StorePath) -> StoreFut<'a, StoreReader>;

  /// Writes a new payload at `path` by running `writer` against a fresh stream.
  ///
  /// Resolves only once the payload is durable.
  fn write<'a>(&'a self, path: &'a StorePath, writer: StoreWriter) -> StoreFut<'a, ()>;

  fn delete_file<'a>(&'a self, path: &'a StorePath) -> StoreFut<'a, ()>;

  fn file_exists<'a>(&'a self, path: &'a StorePath) -> StoreFut<'a, bool>;

  /// Size in bytes of the stored payload.
  fn file_size<'a>(&'a self, path: &'a StorePath) -> StoreFut<'a, u64>;

  /// Mints a fresh, unused path inside `directory`.
  fn random_file_path(&self, directory: &str) -> Result<StorePath, StoreError>;

  fn create_unique_container_name(&self) -> String;
}
