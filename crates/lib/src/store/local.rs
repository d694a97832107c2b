//! Filesystem-backed store.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError, StoreFut, StorePath, StoreReader, StoreWriter};
use crate::consts::CONTAINER_PREFIX;

/// A store rooted at a local directory.
///
/// Payloads are written atomically (temp file in the target container, then
/// rename), so a reader never observes a partially written object and a failed
/// write publishes nothing.
#[derive(Debug, Clone)]
pub struct LocalStore {
  root: PathBuf,
}

impl LocalStore {
  /// Create a store at `root`, creating the directory if needed.
  pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
    let root = root.into();
    std::fs::create_dir_all(&root).map_err(|source| StoreError::CreateDir {
      path: root.clone(),
      source,
    })?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Absolute filesystem location of a store path.
  pub fn resolve(&self, path: &StorePath) -> PathBuf {
    let mut resolved = self.root.clone();
    for segment in path.segments() {
      resolved.push(segment);
    }
    resolved
  }

  fn map_io(path: &StorePath, source: io::Error) -> StoreError {
    if source.kind() == io::ErrorKind::NotFound {
      StoreError::NotFound(path.clone())
    } else {
      StoreError::Io {
        path: path.clone(),
        source,
      }
    }
  }

  fn write_atomic(target: &Path, writer: StoreWriter) -> io::Result<u64> {
    let dir = target
      .parent()
      .ok_or_else(|| io::Error::other("store path has no parent directory"))?;
    let temp = NamedTempFile::new_in(dir)?;

    let mut stream = BufWriter::new(temp);
    writer(&mut stream)?;
    stream.flush()?;
    let temp = stream.into_inner().map_err(|e| e.into_error())?;
    temp.as_file().sync_all()?;
    let bytes = temp.as_file().metadata()?.len();

    // Write-once: never replace an existing payload.
    temp.persist_noclobber(target).map_err(|e| e.error)?;
    Ok(bytes)
  }
}

impl Store for LocalStore {
  fn begin_read<'a>(&'a self, path: &'a StorePath) -> StoreFut<'a, StoreReader> {
    Box::pin(async move {
      let bytes = tokio::fs::read(self.resolve(path))
        .await
        .map_err(|e| Self::map_io(path, e))?;
      Ok(Box::new(io::Cursor::new(bytes)) as StoreReader)
    })
  }

  fn write<'a>(&'a self, path: &'a StorePath, writer: StoreWriter) -> StoreFut<'a, ()> {
    Box::pin(async move {
      let target = self.resolve(path);
      if let Some(dir) = target.parent() {
        tokio::fs::create_dir_all(dir)
          .await
          .map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
          })?;
      }

      // Blocking file I/O stays off the scheduler.
      let bytes = tokio::task::spawn_blocking(move || Self::write_atomic(&target, writer))
        .await
        .unwrap_or_else(|join| Err(io::Error::other(join.to_string())))
        .map_err(|source| StoreError::Write {
          path: path.clone(),
          source,
        })?;

      debug!(path = %path, bytes, "wrote stored object");
      Ok(())
    })
  }

  fn delete_file<'a>(&'a self, path: &'a StorePath) -> StoreFut<'a, ()> {
    Box::pin(async move {
      tokio::fs::remove_file(self.resolve(path))
        .await
        .map_err(|e| Self::map_io(path, e))?;
      debug!(path = %path, "deleted stored object");
      Ok(())
    })
  }

  fn file_exists<'a>(&'a self, path: &'a StorePath) -> StoreFut<'a, bool> {
    Box::pin(async move {
      match tokio::fs::metadata(self.resolve(path)).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(StoreError::Io {
          path: path.clone(),
          source,
        }),
      }
    })
  }

  fn file_size<'a>(&'a self, path: &'a StorePath) -> StoreFut<'a, u64> {
    Box::pin(async move {
      let meta = tokio::fs::metadata(self.resolve(path))
        .await
        .map_err(|e| Self::map_io(path, e))?;
      Ok(meta.len())
    })
  }

  fn random_file_path(&self, directory: &str) -> Result<StorePath, StoreError> {
    StorePath::join(directory, &Uuid::new_v4().simple().to_string())
  }

  fn create_unique_container_name(&self) -> String {
    format!("{}{}", CONTAINER_PREFIX, Uuid::new_v4().simple())
  }
}
