//! Check subcommand

use crate::error::{Diagnostic, Diagnostics, ErrorCode};
use crate::groups::{self, TuningConfig};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeSet;

/// Arguments for the check subcommand
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a check run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub levels: usize,
    pub presets: usize,
    /// Store entries whose text does not parse.
    pub malformed: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    /// Validate every group of every tier and gather what was reported.
    ///
    /// `malformed` lists every stored value that does not parse, including
    /// group `Enabled` toggles, which are not tunables.
    pub fn collect(tuning: &TuningConfig, presets: usize, diagnostics: &Diagnostics) -> Self {
        let mut malformed = BTreeSet::new();
        for tier in std::iter::once(&tuning.global).chain(tuning.levels.values()) {
            for group in tier.groups() {
                malformed.extend(groups::validate(group));
            }
        }
        let diagnostics = diagnostics.snapshot();
        malformed.extend(
            diagnostics
                .iter()
                .filter(|d| d.code == ErrorCode::MalformedValue)
                .filter_map(|d| d.field.clone()),
        );

        Self {
            levels: tuning.levels.len(),
            presets,
            malformed: malformed.into_iter().collect(),
            diagnostics,
        }
    }

    /// Malformed values fail the check; reference problems only warn.
    pub fn passed(&self) -> bool {
        self.malformed.is_empty()
    }
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Checked {} levels, {} presets", self.levels, self.presets)?;
        for d in &self.diagnostics {
            writeln!(f, "  {}", d)?;
        }
        if self.passed() {
            writeln!(f, "OK ({} warnings)", self.diagnostics.len())
        } else {
            writeln!(f, "FAILED: {} malformed values", self.malformed.len())
        }
    }
}
