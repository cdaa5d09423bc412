//! [`Args`] definitions.

use std::path::PathBuf;

use clap::Parser;

/// Desktop dashboard for browsing classified vehicle listings.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file (missing file means defaults).
    #[arg(short, long, default_value = "listings.toml")]
    pub config: String,

    /// Open a local `.json`/`.csv`/`.parquet` dataset instead of the configured source.
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}
