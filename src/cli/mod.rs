//! CLI command definitions for level-tuning
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod check;
pub mod diff;
pub mod resolve;

use check::CheckArgs;
use clap::{Args, Parser, Subcommand};
use diff::DiffArgs;
use resolve::ResolveArgs;
use std::path::PathBuf;

/// Tiered level tuning: bind settings, resolve presets, review overrides
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to the settings store (overrides config)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Path to the preset file (overrides config)
    #[arg(long, global = true)]
    pub presets: Option<PathBuf>,

    /// Path to the baseline snapshot (overrides config)
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bind every tunable for every level into the settings store
    Bind,

    /// Validate the store and presets, exiting non-zero on malformed values
    Check(CheckArgs),

    /// Print the resolved override bundle per level
    Resolve(ResolveArgs),

    /// Show a level's resolved values against its baseline, or compare snapshots
    Diff(DiffArgs),

    /// Show the effective application configuration
    Config(ConfigArgs),
}

/// Arguments for the config subcommand
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show which tier supplied each value
    #[arg(long)]
    pub sources: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["level-tuning", "resolve", "--level", "Titan", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.log, "2");
        match cli.command {
            Command::Resolve(args) => assert_eq!(args.level.as_deref(), Some("Titan")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["level-tuning"]).is_err());
    }
}
