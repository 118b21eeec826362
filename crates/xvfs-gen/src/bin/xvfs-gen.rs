//! xvfs-gen binary.
//!
//! Prints the generated table for a directory on stdout.
//!
//! ```bash
//! xvfs-gen --directory assets --name example > src/embedded.rs
//! ```
//!
//! Set `XVFS_GEN_CONFIG` to a TOML file to change bucket cap, block size or
//! symlink handling.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use xvfs_gen::{Generator, GeneratorConfig, emit_source};

/// Generate an xvfs lookup table from a directory.
#[derive(Parser, Debug)]
#[command(name = "xvfs-gen")]
#[command(about = "Generate an embedded xvfs table from a directory")]
struct Args {
    /// Directory to embed
    #[arg(short, long)]
    directory: PathBuf,

    /// Filesystem name, mounted at //xvfs:/<name>
    #[arg(short, long)]
    name: String,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the generated source.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = GeneratorConfig::from_env().context("loading generator config")?;
    let table = Generator::new(config)
        .generate(&args.directory)
        .with_context(|| format!("generating table for {}", args.directory.display()))?;
    let source = emit_source(&table, &args.name)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(source.as_bytes())
        .context("writing generated source")?;
    stdout.flush()?;
    Ok(())
}
