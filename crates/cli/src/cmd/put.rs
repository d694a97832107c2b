//! Put command implementation.
//!
//! Reads a JSON document from disk and writes it to the store as a persistent
//! reference, printing the resulting store path.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::Value;
use stowage_lib::{Codec, PersistentReference, RuntimeBootstrap};
use tracing::debug;

use crate::output::{OutputFormat, format_bytes, print_json, print_stat, print_success};

pub fn cmd_put(file: &Path, container: Option<&str>, codec: Option<Codec>, output: OutputFormat) -> Result<()> {
  let start = Instant::now();

  let content = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
  let document: Value =
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", file.display()))?;

  let bootstrap = RuntimeBootstrap::from_env().context("Invalid runtime settings")?;
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let (reference, bytes, codec) = rt
    .block_on(async {
      let ctx = bootstrap.default_config().await?;
      let reference = PersistentReference::new(&ctx, &document, container, codec).await?;
      let bytes = reference.size(&ctx).await?;
      let codec = reference.resolved_serializer(&ctx);
      anyhow::Ok((reference, bytes, codec))
    })
    .context("Failed to store document")?;
  debug!(file = %file.display(), path = %reference.path(), bytes, "stored document");

  if output.is_json() {
    print_json(&serde_json::json!({
      "path": reference.path(),
      "uuid": reference.uuid(),
      "codec": codec,
      "bytes": bytes,
    }))?;
  } else {
    print_success(&format!("Stored {}", reference.path()));
    print_stat("Codec", codec.as_str());
    print_stat("Size", &format_bytes(bytes));
    print_stat("Duration", &elapsed_label(start.elapsed()));
  }

  Ok(())
}

fn elapsed_label(elapsed: Duration) -> String {
  if elapsed < Duration::from_secs(1) {
    format!("{}ms", elapsed.as_millis())
  } else {
    format!("{:.2}s", elapsed.as_secs_f64())
  }
}
