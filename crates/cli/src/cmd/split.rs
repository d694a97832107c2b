use anyhow::Result;
use stowage_lib::sync::{split_by_chunk_size, split_by_partition_count};

use crate::output::{OutputFormat, print_info, print_json};

#[derive(Debug, Clone, Copy)]
pub enum SplitMode {
  /// Balanced partitions.
  Parts(usize),
  /// Fixed-size chunks.
  Chunk(usize),
}

pub fn cmd_split(mode: SplitMode, items: &[String], output: OutputFormat) -> Result<()> {
  let slices = match mode {
    SplitMode::Parts(n) => split_by_partition_count(n, items)?,
    SplitMode::Chunk(size) => split_by_chunk_size(size, items)?,
  };

  if output.is_json() {
    print_json(&slices)?;
  } else {
    print_info(&format!("{} partition(s)", slices.len()));
    for (index, slice) in slices.iter().enumerate() {
      println!("  {}: {}", index, slice.join(" "));
    }
  }

  Ok(())
}
