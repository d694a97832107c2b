use stowage_lib::sync::{PartitionError, split_by_chunk_size, split_by_partition_count};

fn flatten(slices: &[&[u32]]) -> Vec<u32> {
  slices.iter().flat_map(|s| s.iter().copied()).collect()
}

#[test]
fn partition_count_laws() {
  for len in 0..40u32 {
    let items: Vec<u32> = (0..len).collect();
    for n in 1..48usize {
      let slices = split_by_partition_count(n, &items).unwrap();
      assert_eq!(flatten(&slices), items, "len={len} n={n}");

      if n == 1 {
        assert_eq!(slices.len(), 1);
        continue;
      }
      assert_eq!(slices.len(), n.min(items.len()), "len={len} n={n}");

      let sizes: Vec<usize> = slices.iter().map(|s| s.len()).collect();
      assert!(sizes.windows(2).all(|w| w[0] >= w[1]), "len={len} n={n} sizes={sizes:?}");
      if let (Some(max), Some(min)) = (sizes.iter().max(), sizes.iter().min()) {
        assert!(max - min <= 1, "len={len} n={n} sizes={sizes:?}");
      }
    }
  }
}

#[test]
fn chunk_size_laws() {
  for len in 1..40u32 {
    let items: Vec<u32> = (0..len).collect();
    for size in 1..=items.len() {
      let slices = split_by_chunk_size(size, &items).unwrap();
      assert_eq!(flatten(&slices), items, "len={len} size={size}");
      assert_eq!(slices.len(), items.len().div_ceil(size));

      let (last, full) = slices.split_last().unwrap();
      assert!(full.iter().all(|s| s.len() == size));
      assert!(!last.is_empty() && last.len() <= size);
    }
  }
}

#[test]
fn degenerate_arguments() {
  let items = [1u32, 2, 3];
  assert_eq!(split_by_partition_count(0, &items), Err(PartitionError::ZeroPartitions));
  assert_eq!(
    split_by_chunk_size(4, &items),
    Err(PartitionError::InvalidChunkSize { size: 4, len: 3 })
  );

  let empty: [u32; 0] = [];
  assert!(split_by_chunk_size(1, &empty).is_err());
}
