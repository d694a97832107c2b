//! Deterministic partitioning of ordered sequences.
//!
//! Both splitters return borrowed, contiguous slices that concatenate, in
//! order, to the input.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionError {
  #[error("partition count must be at least 1")]
  ZeroPartitions,

  #[error("chunk size {size} must be between 1 and the sequence length {len}")]
  InvalidChunkSize { size: usize, len: usize },
}

/// Splits `items` into `partitions` balanced slices.
///
/// The first `len % partitions` slices hold one extra element, so sizes are
/// non-increasing and differ by at most one. With `partitions == 1` the whole
/// sequence is returned as one slice; with more partitions than elements each
/// element gets its own slice.
pub fn split_by_partition_count<T>(partitions: usize, items: &[T]) -> Result<Vec<&[T]>, PartitionError> {
  if partitions == 0 {
    return Err(PartitionError::ZeroPartitions);
  }
  if partitions == 1 {
    return Ok(vec![items]);
  }
  if partitions > items.len() {
    return Ok(items.chunks(1).collect());
  }

  let base = items.len() / partitions;
  let extra = items.len() % partitions;

  let mut slices = Vec::with_capacity(partitions);
  let mut rest = items;
  for index in 0..partitions {
    let size = if index < extra { base + 1 } else { base };
    let (head, tail) = rest.split_at(size);
    slices.push(head);
    rest = tail;
  }
  Ok(slices)
}

/// Splits `items` into slices of exactly `size` elements, plus a final
/// shorter slice for any remainder.
pub fn split_by_chunk_size<T>(size: usize, items: &[T]) -> Result<Vec<&[T]>, PartitionError> {
  if size == 0 || size > items.len() {
    return Err(PartitionError::InvalidChunkSize { size, len: items.len() });
  }
  Ok(items.chunks(size).collect())
}
