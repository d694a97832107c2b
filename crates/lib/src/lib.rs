//! stowage-lib: write-once persistent references and the runtime around them
//!
//! This crate provides the building blocks a parallel job runtime uses to move
//! large values between workers by handle instead of by copy:
//! - `PersistentReference`: a typed, shippable handle to a value written once to a store
//! - `ExecutionContextConfig`: the store, serializer, and cache in effect for a job
//! - `RuntimeBootstrap`: process-wide setup that runs exactly once, on first use
//! - `sync`: counters, deadline-bounded waits, and sequence partitioning

pub mod bootstrap;
pub mod cache;
pub mod consts;
pub mod context;
pub mod platform;
pub mod reference;
pub mod serializer;
pub mod store;
pub mod sync;

pub use bootstrap::{BootstrapError, BootstrapSettings, RuntimeBootstrap};
pub use cache::{Cache, CacheValue, MemoryCache};
pub use context::ExecutionContextConfig;
pub use reference::{PersistentReference, ReferenceError};
pub use serializer::{Codec, SerializeError, Serializer};
pub use store::{LocalStore, Store, StoreError, StorePath};
