//! Persistent, cacheable references to values written once to a store.
//!
//! A [`PersistentReference`] is a small handle (store path + cache key) that
//! can be shipped between workers instead of the value itself. Dereferencing
//! checks the process-local cache first and falls back to reading and
//! deserializing the stored payload.
//!
//! # Cache keys
//!
//! The cache key is a uuid minted per reference instance, not the store path.
//! Two references built separately against the same path (for example two
//! [`PersistentReference::parse`] calls) are cached independently.
//!
//! # Disposal
//!
//! [`PersistentReference::dispose`] deletes the stored payload but leaves any
//! cache entry in place. A reference that was cached before disposal keeps
//! serving the cached value; an uncached one fails with a not-found error.

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::context::ExecutionContextConfig;
use crate::serializer::{Codec, SerializeError, Serializer};
use crate::store::{StoreError, StorePath, StoreWriter};

/// Errors from reference operations.
#[derive(Debug, Error)]
pub enum ReferenceError {
  /// `parse` found no payload at the path.
  #[error("no stored object at {0}")]
  NotFound(StorePath),

  /// The store failed; propagated unchanged.
  #[error(transparent)]
  Store(#[from] StoreError),

  /// Encoding failed, or the payload does not decode as the requested type.
  #[error(transparent)]
  Serialize(#[from] SerializeError),

  /// The cached value under this reference's key is of a different type.
  #[error("cached value for {path} is not a {expected}")]
  TypeMismatch { path: StorePath, expected: &'static str },
}

impl ReferenceError {
  /// True for both a failed existence check and a store-level missing payload.
  pub fn is_not_found(&self) -> bool {
    match self {
      ReferenceError::NotFound(_) => true,
      ReferenceError::Store(err) => err.is_not_found(),
      _ => false,
    }
  }
}

/// A write-once, store-backed, locally cacheable handle to a `T`.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PersistentReference<T> {
  path: StorePath,
  uuid: Uuid,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  serializer: Option<Codec>,
  #[serde(skip)]
  _marker: PhantomData<fn() -> T>,
}

impl<T> PersistentReference<T> {
  fn bind(path: StorePath, serializer: Option<Codec>) -> Self {
    Self {
      path,
      uuid: Uuid::new_v4(),
      serializer,
      _marker: PhantomData,
    }
  }

  pub fn path(&self) -> &StorePath {
    &self.path
  }

  pub fn uuid(&self) -> Uuid {
    self.uuid
  }

  pub fn serializer_override(&self) -> Option<Codec> {
    self.serializer
  }

  /// The override if one is pinned, else the context default.
  pub fn resolved_serializer(&self, ctx: &ExecutionContextConfig) -> Codec {
    self.serializer.unwrap_or(ctx.serializer())
  }

  fn cache_key(&self) -> String {
    self.uuid.to_string()
  }

  /// Whether the cache currently holds a value for this reference. No I/O.
  pub fn is_cached_locally(&self, ctx: &ExecutionContextConfig) -> bool {
    ctx.cache().is_some_and(|cache| cache.contains_key(&self.cache_key()))
  }

  /// Size in bytes of the stored payload, read from the store every time.
  pub async fn size(&self, ctx: &ExecutionContextConfig) -> Result<u64, ReferenceError> {
    Ok(ctx.store().file_size(&self.path).await?)
  }

  /// Deletes the stored payload. The cache entry, if any, is kept.
  pub async fn dispose(&self, ctx: &ExecutionContextConfig) -> Result<(), ReferenceError> {
    ctx.store().delete_file(&self.path).await?;
    debug!(path = %self.path, uuid = %self.uuid, "disposed persistent reference");
    Ok(())
  }
}

impl<T> PersistentReference<T>
where
  T: Serialize + Sync,
{
  /// Serializes `value` into a fresh path and returns a reference to it.
  ///
  /// `directory` defaults to the context's default directory and `serializer`
  /// to the context's serializer. The value is encoded up front, so an encode
  /// failure never reaches the store. Returns only after the store confirms the
  /// write.
  pub async fn new(
    ctx: &ExecutionContextConfig,
    value: &T,
    directory: Option<&str>,
    serializer: Option<Codec>,
  ) -> Result<Self, ReferenceError> {
    let directory = directory.unwrap_or(ctx.default_directory());
    let codec = serializer.unwrap_or(ctx.serializer());
    let path = ctx.store().random_file_path(directory)?;

    let mut payload = Vec::new();
    codec.serialize_into(&mut payload, value)?;

    let writer: StoreWriter = Box::new(move |stream: &mut dyn Write| stream.write_all(&payload));
    ctx.store().write(&path, writer).await?;

    let reference = Self::bind(path, serializer);
    debug!(path = %reference.path, uuid = %reference.uuid, codec = %codec, "created persistent reference");
    Ok(reference)
  }
}

impl<T> PersistentReference<T>
where
  T: DeserializeOwned + Send + Sync + 'static,
{
  /// Binds to an already written payload without re-serializing it.
  ///
  /// With `force`, the value is fetched into the cache immediately. Otherwise
  /// (or when the context has no cache) only existence is checked. The stored
  /// bytes are not checked against `T`; a mismatch surfaces later as a decode
  /// error.
  pub async fn parse(
    ctx: &ExecutionContextConfig,
    path: StorePath,
    serializer: Option<Codec>,
    force: bool,
  ) -> Result<Self, ReferenceError> {
    let reference = Self::bind(path, serializer);

    if force && ctx.cache().is_some() {
      reference.populate_cache(ctx).await?;
    } else if !ctx.store().file_exists(&reference.path).await? {
      return Err(ReferenceError::NotFound(reference.path));
    }

    Ok(reference)
  }

  /// Ensures the cache holds this reference's value.
  ///
  /// Returns `true` immediately when already cached. Otherwise fetches from
  /// the store and returns the cache's own result for the add, which is
  /// `false` if a concurrent populate got there first. Without a cache this
  /// is `false` and performs no I/O.
  pub async fn populate_cache(&self, ctx: &ExecutionContextConfig) -> Result<bool, ReferenceError> {
    let Some(cache) = ctx.cache() else {
      return Ok(false);
    };

    let key = self.cache_key();
    if cache.contains_key(&key) {
      return Ok(true);
    }

    let value = self.fetch(ctx).await?;
    let added = cache.add(key, Arc::new(value));
    debug!(path = %self.path, uuid = %self.uuid, added, "populated cache");
    Ok(added)
  }

  async fn fetch(&self, ctx: &ExecutionContextConfig) -> Result<T, ReferenceError> {
    let reader = ctx.store().begin_read(&self.path).await?;
    let value = self.resolved_serializer(ctx).deserialize_from(reader)?;
    Ok(value)
  }
}

impl<T> PersistentReference<T>
where
  T: DeserializeOwned + Clone + Send + Sync + 'static,
{
  /// Dereferences: the cached value if present, else a fresh read from the store.
  ///
  /// A miss does not populate the cache.
  pub async fn value(&self, ctx: &ExecutionContextConfig) -> Result<T, ReferenceError> {
    if let Some(cached) = ctx.cache().and_then(|cache| cache.try_find(&self.cache_key())) {
      let typed = cached.downcast::<T>().map_err(|_| ReferenceError::TypeMismatch {
        path: self.path.clone(),
        expected: type_name::<T>(),
      })?;
      return Ok(Arc::unwrap_or_clone(typed));
    }

    self.fetch(ctx).await
  }
}

impl<T> Clone for PersistentReference<T> {
  fn clone(&self) -> Self {
    Self {
      path: self.path.clone(),
      uuid: self.uuid,
      serializer: self.serializer,
      _marker: PhantomData,
    }
  }
}

impl<T> fmt::Debug for PersistentReference<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PersistentReference")
      .field("type", &type_name::<T>())
      .field("path", &self.path)
      .field("uuid", &self.uuid)
      .field("serializer", &self.serializer)
      .finish()
  }
}

impl<T> fmt::Display for PersistentReference<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "PersistentReference<{}> at {}", type_name::<T>(), self.path)
  }
}

/// Identity is the store path; the uuid is only a local cache key.
impl<T> PartialEq for PersistentReference<T> {
  fn eq(&self, other: &Self) -> bool {
    self.path == other.path
  }
}

impl<T> Eq for PersistentReference<T> {}

impl<T> Hash for PersistentReference<T> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.path.hash(state);
  }
}
