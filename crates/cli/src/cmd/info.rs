//! Info command implementation.
//!
//! Bootstraps the runtime and reports where it stores data and where it listens.

use anyhow::{Context, Result};
use stowage_lib::RuntimeBootstrap;

use crate::output::{OutputFormat, print_info, print_json, print_stat};

pub fn cmd_info(verbose: bool, output: OutputFormat) -> Result<()> {
  let bootstrap = RuntimeBootstrap::from_env().context("Invalid runtime settings")?;
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let (address, fresh_container) = rt
    .block_on(async {
      let address = bootstrap.address().await?;
      let fresh = bootstrap.create_unique_container_name().await?;
      anyhow::Ok((address, fresh))
    })
    .context("Failed to bootstrap runtime")?;

  let settings = bootstrap.settings();
  if output.is_json() {
    print_json(&serde_json::json!({
      "version": env!("CARGO_PKG_VERSION"),
      "store_root": settings.store_root,
      "listen": settings.listen,
      "address": address,
      "serializer": settings.serializer,
      "default_container": settings.default_container,
      "fresh_container": fresh_container,
      "setup_runs": bootstrap.setup_runs(),
    }))?;
  } else {
    print_info(&format!("stowage v{}", env!("CARGO_PKG_VERSION")));
    print_stat("Store", &settings.store_root.display().to_string());
    print_stat("Address", &address);
    print_stat("Serializer", settings.serializer.as_str());
    print_stat("Container", &settings.default_container);
    print_stat("Fresh container", &fresh_container);

    if verbose {
      print_stat("Listen", &settings.listen.to_string());
      print_stat("Setup runs", &bootstrap.setup_runs().to_string());
    }
  }

  Ok(())
}
