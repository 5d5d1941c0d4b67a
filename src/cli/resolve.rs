//! Resolve subcommand

use clap::Args;
use std::path::PathBuf;

/// Arguments for the resolve subcommand
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Only this level (default: every level)
    #[arg(long, value_name = "LEVEL")]
    pub level: Option<String>,

    /// Write JSON here instead of stdout (overrides config)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Compact JSON output (default: pretty)
    #[arg(long)]
    pub compact: bool,

    /// Include levels with no overrides
    #[arg(long)]
    pub include_empty: bool,
}
