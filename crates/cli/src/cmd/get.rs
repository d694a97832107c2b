use anyhow::{Context, Result};
use serde_json::Value;
use stowage_lib::{Codec, PersistentReference, RuntimeBootstrap, StorePath};

use crate::output::{OutputFormat, print_json};

pub fn cmd_get(path: &str, codec: Option<Codec>, output: OutputFormat) -> Result<()> {
  let path: StorePath = path.parse().context("Invalid store path")?;

  let bootstrap = RuntimeBootstrap::from_env().context("Invalid runtime settings")?;
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let document = rt
    .block_on(async {
      let ctx = bootstrap.default_config().await?;
      let reference = PersistentReference::<Value>::parse(&ctx, path.clone(), codec, false).await?;
      anyhow::Ok(reference.value(&ctx).await?)
    })
    .with_context(|| format!("Failed to load {}", path))?;

  if output.is_json() {
    print_json(&serde_json::json!({ "path": path, "value": document }))?;
  } else {
    print_json(&document)?;
  }

  Ok(())
}
