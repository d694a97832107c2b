use anyhow::{Context, Result};
use serde_json::Value;
use stowage_lib::{PersistentReference, RuntimeBootstrap, StorePath};

use crate::output::{OutputFormat, print_json, print_success};

pub fn cmd_rm(path: &str, output: OutputFormat) -> Result<()> {
  let path: StorePath = path.parse().context("Invalid store path")?;

  let bootstrap = RuntimeBootstrap::from_env().context("Invalid runtime settings")?;
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(async {
    let ctx = bootstrap.default_config().await?;
    let reference = PersistentReference::<Value>::parse(&ctx, path.clone(), None, false).await?;
    reference.dispose(&ctx).await?;
    anyhow::Ok(())
  })
  .with_context(|| format!("Failed to remove {}", path))?;

  if output.is_json() {
    print_json(&serde_json::json!({ "removed": path }))?;
  } else {
    print_success(&format!("Removed {}", path));
  }

  Ok(())
}
