use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stowage_lib::{Codec, PersistentReference, ReferenceError};

use super::common::TestStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Shard {
  id: u32,
  label: String,
  weights: Vec<f64>,
  tags: BTreeMap<String, i64>,
}

fn shard(id: u32) -> Shard {
  Shard {
    id,
    label: format!("shard-{id}"),
    weights: vec![0.5, 1.25, -3.0],
    tags: BTreeMap::from([("epoch".to_string(), 7), ("rank".to_string(), i64::from(id))]),
  }
}

#[tokio::test]
async fn round_trip_with_every_codec() {
  let env = TestStore::new();

  for codec in [Codec::Json, Codec::JsonPretty, Codec::Cbor] {
    let ctx = env.cached(codec);
    let reference = PersistentReference::new(&ctx, &shard(1), None, None).await.unwrap();
    assert_eq!(reference.value(&ctx).await.unwrap(), shard(1), "codec {codec}");

    assert!(reference.populate_cache(&ctx).await.unwrap());
    assert_eq!(reference.value(&ctx).await.unwrap(), shard(1), "codec {codec}");
  }
}

#[tokio::test]
async fn populate_is_idempotent() {
  let env = TestStore::new();
  let ctx = env.cached(Codec::Json);
  let reference = PersistentReference::new(&ctx, &shard(2), None, None).await.unwrap();

  assert!(!reference.is_cached_locally(&ctx));
  assert!(reference.populate_cache(&ctx).await.unwrap());
  assert!(reference.is_cached_locally(&ctx));
  assert!(reference.populate_cache(&ctx).await.unwrap());
  assert_eq!(ctx.cache().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_populates_agree() {
  let env = TestStore::new();
  let ctx = Arc::new(env.cached(Codec::Cbor));
  let reference = PersistentReference::new(&ctx, &shard(3), None, None).await.unwrap();

  let mut join_set = tokio::task::JoinSet::new();
  for _ in 0..8 {
    let ctx = ctx.clone();
    let reference = reference.clone();
    join_set.spawn(async move { reference.populate_cache(&ctx).await.unwrap() });
  }
  while let Some(res) = join_set.join_next().await {
    res.unwrap();
  }

  assert!(reference.is_cached_locally(&ctx));
  assert_eq!(ctx.cache().unwrap().len(), 1);
  assert_eq!(reference.value(&ctx).await.unwrap(), shard(3));
}

#[tokio::test]
async fn disposed_cached_reference_keeps_serving() {
  let env = TestStore::new();
  let ctx = env.cached(Codec::Json);
  let reference = PersistentReference::new(&ctx, &shard(4), None, None).await.unwrap();
  reference.populate_cache(&ctx).await.unwrap();

  reference.dispose(&ctx).await.unwrap();

  assert!(!ctx.store().file_exists(reference.path()).await.unwrap());
  assert!(reference.is_cached_locally(&ctx));
  assert_eq!(reference.value(&ctx).await.unwrap(), shard(4));
  assert!(reference.size(&ctx).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn disposed_uncached_reference_is_gone() {
  let env = TestStore::new();
  let ctx = env.uncached(Codec::Json);
  let reference = PersistentReference::new(&ctx, &shard(5), None, None).await.unwrap();

  reference.dispose(&ctx).await.unwrap();

  assert!(reference.value(&ctx).await.unwrap_err().is_not_found());
  assert!(reference.dispose(&ctx).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn parse_binds_to_existing_payload() {
  let env = TestStore::new();
  let ctx = env.cached(Codec::Json);
  let original = PersistentReference::new(&ctx, &shard(6), None, None).await.unwrap();

  let lazy = PersistentReference::<Shard>::parse(&ctx, original.path().clone(), None, false)
    .await
    .unwrap();
  assert!(!lazy.is_cached_locally(&ctx));

  let eager = PersistentReference::<Shard>::parse(&ctx, original.path().clone(), None, true)
    .await
    .unwrap();
  assert!(eager.is_cached_locally(&ctx));

  // Same payload, independent cache keys.
  assert_eq!(lazy, eager);
  assert_ne!(lazy.uuid(), eager.uuid());
  assert!(!original.is_cached_locally(&ctx));
  assert_eq!(eager.value(&ctx).await.unwrap(), shard(6));
}

#[tokio::test]
async fn parse_of_missing_path_is_not_found() {
  let env = TestStore::new();
  let ctx = env.uncached(Codec::Json);
  let path = "jobs/never-written".parse().unwrap();

  let err = PersistentReference::<Shard>::parse(&ctx, path, None, false)
    .await
    .unwrap_err();
  assert!(matches!(err, ReferenceError::NotFound(_)));
}

#[tokio::test]
async fn references_in_distinct_containers_never_collide() {
  let env = TestStore::new();
  let ctx = env.uncached(Codec::Json);

  let mut paths = std::collections::HashSet::new();
  for i in 0..32u32 {
    let container = if i % 2 == 0 { "even" } else { "odd" };
    let reference = PersistentReference::new(&ctx, &i, Some(container), None).await.unwrap();
    assert!(paths.insert(reference.path().clone()));
    assert_eq!(reference.value(&ctx).await.unwrap(), i);
  }
}

#[tokio::test]
async fn size_reflects_codec() {
  let env = TestStore::new();
  let ctx = env.uncached(Codec::Json);
  let value = shard(7);

  let compact = PersistentReference::new(&ctx, &value, None, Some(Codec::Json)).await.unwrap();
  let pretty = PersistentReference::new(&ctx, &value, None, Some(Codec::JsonPretty)).await.unwrap();

  let expected = serde_json::to_vec(&value).unwrap().len() as u64;
  assert_eq!(compact.size(&ctx).await.unwrap(), expected);
  assert!(pretty.size(&ctx).await.unwrap() > expected);
}
