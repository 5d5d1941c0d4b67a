//! Level Tuning Library
//!
//! Tiered tuning configuration for game levels plus a preset inheritance
//! resolver. A global tier supplies defaults, each level tier may override
//! them, and a chain of presets mapped to a level wins over both.
//!
//! The entry point for consumers is [`overrides::ResolvedOverrides`], built
//! from a bound [`groups::TuningConfig`] and a [`presets::PresetLibrary`].

pub mod catalog;
pub mod cli;
pub mod config;
pub mod curve;
pub mod error;
pub mod export;
pub mod groups;
pub mod overrides;
pub mod presets;
pub mod store;
pub mod value;
