//! Concurrency primitives used to fan work across workers.
//!
//! - `AtomicCounter`: lock-free, monotonically increasing counter
//! - `DeadlineTask`: races an operation against a timeout without cancelling it
//! - `partition`: deterministic splitting of a sequence into slices

pub mod counter;
pub mod deadline;
pub mod partition;

pub use counter::AtomicCounter;
pub use deadline::{DeadlineError, DeadlineTask, Timeout, TimeoutError, with_deadline, with_soft_deadline};
pub use partition::{PartitionError, split_by_chunk_size, split_by_partition_count};
