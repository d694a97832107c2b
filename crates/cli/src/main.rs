mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use stowage_lib::Codec;
use tracing_subscriber::EnvFilter;

use crate::cmd::{SplitMode, cmd_get, cmd_info, cmd_put, cmd_rm, cmd_size, cmd_split};
use crate::output::OutputFormat;

/// stow - inspect and exercise a local stowage store
#[derive(Parser)]
#[command(name = "stow")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Store a JSON document and print its store path
  Put {
    /// JSON file to store
    file: PathBuf,

    /// Container to write into (default: the configured container)
    #[arg(short, long)]
    container: Option<String>,

    /// Codec for the stored payload (json, json-pretty, cbor)
    #[arg(long)]
    codec: Option<Codec>,
  },

  /// Print a stored document as JSON
  Get {
    /// Store path, as printed by `put`
    path: String,

    /// Codec the payload was written with
    #[arg(long)]
    codec: Option<Codec>,
  },

  /// Print the size of a stored payload
  Size {
    /// Store path
    path: String,
  },

  /// Delete a stored payload
  Rm {
    /// Store path
    path: String,
  },

  /// Show store and runtime information
  Info,

  /// Partition a list of items
  #[command(group(ArgGroup::new("mode").required(true).args(["parts", "chunk"])))]
  Split {
    /// Number of balanced partitions
    #[arg(long)]
    parts: Option<usize>,

    /// Fixed chunk size
    #[arg(long)]
    chunk: Option<usize>,

    /// Items to partition
    items: Vec<String>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Put { file, container, codec } => cmd_put(&file, container.as_deref(), codec, cli.output),
    Commands::Get { path, codec } => cmd_get(&path, codec, cli.output),
    Commands::Size { path } => cmd_size(&path, cli.output),
    Commands::Rm { path } => cmd_rm(&path, cli.output),
    Commands::Info => cmd_info(cli.verbose, cli.output),
    Commands::Split { parts, chunk, items } => {
      let mode = parts
        .map(SplitMode::Parts)
        .or(chunk.map(SplitMode::Chunk))
        .context("either --parts or --chunk is required")?;
      cmd_split(mode, &items, cli.output)
    }
  }
}
