use anyhow::{Context, Result};
use serde_json::Value;
use stowage_lib::{PersistentReference, RuntimeBootstrap, StorePath};

use crate::output::{OutputFormat, format_bytes, print_json, print_stat};

pub fn cmd_size(path: &str, output: OutputFormat) -> Result<()> {
  let path: StorePath = path.parse().context("Invalid store path")?;

  let bootstrap = RuntimeBootstrap::from_env().context("Invalid runtime settings")?;
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let bytes = rt
    .block_on(async {
      let ctx = bootstrap.default_config().await?;
      let reference = PersistentReference::<Value>::parse(&ctx, path.clone(), None, false).await?;
      anyhow::Ok(reference.size(&ctx).await?)
    })
    .with_context(|| format!("Failed to stat {}", path))?;

  if output.is_json() {
    print_json(&serde_json::json!({ "path": path, "bytes": bytes }))?;
  } else {
    print_stat("Path", path.as_str());
    print_stat("Size", &format!("{} ({} bytes)", format_bytes(bytes), bytes));
  }

  Ok(())
}
