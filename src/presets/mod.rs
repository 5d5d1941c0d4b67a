//! Presets: named, inheritable override bundles applied on top of the tiers.

pub mod chain;
pub mod document;
pub mod library;
pub mod path;

pub use chain::{PresetChain, Resolution};
pub use document::PresetDocument;
pub use library::{PresetFile, PresetLibrary};
pub use path::{FieldPath, FromPresetValue, PathStep, PresetRecord, PresetValue};
