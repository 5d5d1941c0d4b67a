//! Structured diagnostics and error types.
//!
//! Nothing in the resolution core aborts setup: problems in operator-written
//! files are reported as [`Diagnostic`]s into a shared [`Diagnostics`]
//! collector and the affected element falls back to its default. Only
//! structural failures (unreadable files, an unwritable store) propagate as
//! `anyhow::Error`.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Error codes for programmatic handling of reported problems.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A stored scalar/curve string does not parse.
    MalformedValue,
    /// A parent id, entity id, or level mapping target does not resolve.
    UnknownReference,
    /// Two presets claim the same id or name.
    DuplicatePreset,
    /// A level id collides with a section the global tier owns.
    ReservedName,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::MalformedValue => write!(f, "malformed value"),
            ErrorCode::UnknownReference => write!(f, "unknown reference"),
            ErrorCode::DuplicatePreset => write!(f, "duplicate preset"),
            ErrorCode::ReservedName => write!(f, "reserved name"),
        }
    }
}

/// One reported problem, with enough context to find it in the source file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            level: None,
            preset: None,
            field: None,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn malformed(field: &str, raw: &str, err: &ValueError) -> Self {
        Self::new(
            ErrorCode::MalformedValue,
            format!("cannot parse '{}': {}", raw, err),
        )
        .with_field(field)
    }

    pub fn unknown_parent(preset: &str, parent: &str) -> Self {
        Self::new(
            ErrorCode::UnknownReference,
            format!("parent preset '{}' does not exist", parent),
        )
        .with_preset(preset)
    }

    pub fn unknown_entity(preset: &str, list: &str, id: &str) -> Self {
        Self::new(
            ErrorCode::UnknownReference,
            format!("'{}' is not a known id for {}, entry dropped", id, list),
        )
        .with_preset(preset)
        .with_field(list)
    }

    pub fn unknown_preset(level: &str, preset_name: &str) -> Self {
        Self::new(
            ErrorCode::UnknownReference,
            format!("no preset named '{}', level left without a preset", preset_name),
        )
        .with_level(level)
    }

    pub fn unknown_level(level: &str) -> Self {
        Self::new(
            ErrorCode::UnknownReference,
            format!("level '{}' is not in the snapshot, mapping dropped", level),
        )
        .with_level(level)
    }

    pub fn reserved_level(level: &str) -> Self {
        Self::new(
            ErrorCode::ReservedName,
            format!(
                "level '{}' would share store sections with the global tier, skipped",
                level
            ),
        )
        .with_level(level)
    }

    pub fn duplicate_id(id: &str) -> Self {
        Self::new(
            ErrorCode::DuplicatePreset,
            format!("preset id '{}' is defined more than once, first one kept", id),
        )
        .with_preset(id)
    }

    pub fn duplicate_name(name: &str, kept: &str) -> Self {
        Self::new(
            ErrorCode::DuplicatePreset,
            format!(
                "preset name '{}' is used more than once, mappings use '{}'",
                name, kept
            ),
        )
        .with_preset(kept)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code)?;
        if let Some(ref level) = self.level {
            write!(f, " level={}", level)?;
        }
        if let Some(ref preset) = self.preset {
            write!(f, " preset={}", preset)?;
        }
        if let Some(ref field) = self.field {
            write!(f, " field={}", field)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Shared collector for diagnostics.
///
/// Cloning yields a handle to the same list. Every report is also emitted as
/// a tracing event so operators see problems even if nobody drains the list.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Returns false if an identical one was already
    /// recorded, in which case nothing is logged either.
    pub fn report(&self, diagnostic: Diagnostic) -> bool {
        {
            let Ok(mut entries) = self.entries.lock() else {
                return false;
            };
            // The same stored string is re-read on every access.
            if entries.contains(&diagnostic) {
                return false;
            }
            entries.push(diagnostic.clone());
        }
        match diagnostic.code {
            ErrorCode::MalformedValue => tracing::error!(
                code = ?diagnostic.code,
                level = diagnostic.level.as_deref(),
                preset = diagnostic.preset.as_deref(),
                field = diagnostic.field.as_deref(),
                "{}",
                diagnostic.message
            ),
            _ => tracing::warn!(
                code = ?diagnostic.code,
                level = diagnostic.level.as_deref(),
                preset = diagnostic.preset.as_deref(),
                field = diagnostic.field.as_deref(),
                "{}",
                diagnostic.message
            ),
        }
        true
    }

    /// Copy of everything reported so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, code: ErrorCode) -> usize {
        self.entries
            .lock()
            .map(|e| e.iter().filter(|d| d.code == code).count())
            .unwrap_or(0)
    }

    /// True if any stored value failed to parse.
    pub fn has_malformed(&self) -> bool {
        self.count(ErrorCode::MalformedValue) > 0
    }
}

/// Failure to parse a stored string into a typed value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueError {
    #[error("expected an integer")]
    Integer,
    #[error("expected a number")]
    Float,
    #[error("expected true or false")]
    Bool,
    #[error("curve segment '{0}' is not time:value")]
    CurveSegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let d = Diagnostic::unknown_entity("hard", "enemies", "FlowerMan").with_level("Titan");
        let text = d.to_string();
        assert!(text.starts_with("[unknown reference]"));
        assert!(text.contains("level=Titan"));
        assert!(text.contains("preset=hard"));
        assert!(text.contains("field=enemies"));
        assert!(text.contains("FlowerMan"));
    }

    #[test]
    fn test_collector_is_shared_and_deduplicated() {
        let diagnostics = Diagnostics::new();
        let handle = diagnostics.clone();
        let err = ValueError::Integer;

        assert!(handle.report(Diagnostic::malformed("Scrap.MinScrap", "lots", &err)));
        assert!(!handle.report(Diagnostic::malformed("Scrap.MinScrap", "lots", &err)));
        assert!(diagnostics.report(Diagnostic::unknown_parent("a", "b")));

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_malformed());
        assert_eq!(diagnostics.count(ErrorCode::UnknownReference), 1);
        assert_eq!(diagnostics.count(ErrorCode::DuplicatePreset), 0);
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::UnknownReference).unwrap();
        assert_eq!(json, "\"UNKNOWN_REFERENCE\"");
    }
}
