//! Tri-state tunable values.
//!
//! A [`ValueSource`] is bound to one store entry and decides, from the stored
//! string alone, which of three sources supplies the value:
//!
//! - an explicit value written by the operator,
//! - the global tier (`GLOBAL`, or blank on a level entry),
//! - the caller's baseline (`DEFAULT`).
//!
//! Nothing is cached; every read re-inspects the stored string.

use crate::curve::Curve;
use crate::error::{Diagnostic, Diagnostics, ValueError};
use crate::store::{EntryKey, SettingsStore};
use anyhow::Result;
use heck::ToUpperCamelCase;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Sentinel selecting the built-in baseline.
pub const DEFAULT_TOKEN: &str = "DEFAULT";
/// Sentinel selecting the global tier.
pub const GLOBAL_TOKEN: &str = "GLOBAL";

/// Types that can live in the settings store as text.
pub trait ConfigValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn parse_stored(text: &str) -> Result<Self, ValueError>;
    fn render(&self) -> String;
}

impl ConfigValue for i32 {
    fn parse_stored(text: &str) -> Result<Self, ValueError> {
        text.trim().parse().map_err(|_| ValueError::Integer)
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl ConfigValue for f32 {
    fn parse_stored(text: &str) -> Result<Self, ValueError> {
        text.trim().parse().map_err(|_| ValueError::Float)
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl ConfigValue for bool {
    fn parse_stored(text: &str) -> Result<Self, ValueError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ValueError::Bool),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl ConfigValue for String {
    fn parse_stored(text: &str) -> Result<Self, ValueError> {
        Ok(text.trim().to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl ConfigValue for Curve {
    fn parse_stored(text: &str) -> Result<Self, ValueError> {
        Curve::parse(text)
    }

    fn render(&self) -> String {
        self.encode()
    }
}

/// Which source currently supplies a value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueState<T> {
    /// Not backed by the store at all (the owning group is disabled).
    Empty,
    /// Use the caller's baseline.
    Default,
    /// Defer to the global tier.
    Global,
    /// Operator-supplied value.
    Explicit(T),
}

/// Tier that supplied an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSource {
    Level,
    Global,
}

/// Which tier a group of values is bound for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tier {
    Global,
    Level(String),
}

impl Tier {
    /// Whether values of this tier accept the `GLOBAL` sentinel.
    pub fn supports_global(&self) -> bool {
        matches!(self, Tier::Level(_))
    }

    /// Whether a level with this id would write into the global tier's
    /// sections (`Global` itself, or anything under `Global.`).
    pub fn collides_with_global(level_id: &str) -> bool {
        let global = Tier::Global.section();
        level_id
            .strip_prefix(global)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    }

    /// Section prefix in the store.
    pub fn section(&self) -> &str {
        match self {
            Tier::Global => "Global",
            Tier::Level(name) => name,
        }
    }
}

#[derive(Debug)]
enum Binding {
    Empty,
    Bound {
        store: Arc<dyn SettingsStore>,
        entry: EntryKey,
    },
}

/// Object-safe view used by groups to answer aggregate questions.
pub trait Tunable: fmt::Debug + Send + Sync {
    /// Dotted store path, for diagnostics.
    fn name(&self) -> &str;
    fn is_default(&self) -> bool;
    fn is_locally_set(&self) -> bool;
    /// Parse the stored string without falling back, for validation passes.
    fn validate(&self) -> Result<(), ValueError>;
}

/// A value bound to one store entry with tiered fallback.
#[derive(Debug)]
pub struct ValueSource<T: ConfigValue> {
    name: String,
    binding: Binding,
    default: T,
    supports_global: bool,
    global: Option<Arc<ValueSource<T>>>,
    diagnostics: Diagnostics,
}

impl<T: ConfigValue> ValueSource<T> {
    /// A value that never touches the store.
    ///
    /// Reads fall through to `global` when present, otherwise to the baseline.
    pub fn empty(name: impl Into<String>, default: T, global: Option<Arc<ValueSource<T>>>) -> Self {
        Self {
            name: name.into(),
            binding: Binding::Empty,
            default,
            supports_global: global.is_some(),
            global,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Current state, parsed from the stored string.
    ///
    /// Unparseable text is reported and treated as [`ValueState::Default`].
    pub fn state(&self) -> ValueState<T> {
        let Binding::Bound { store, entry } = &self.binding else {
            return ValueState::Empty;
        };
        let raw = store.read_string(entry).unwrap_or_default();
        match classify::<T>(&raw, self.supports_global) {
            Ok(state) => state,
            Err(err) => {
                self.diagnostics
                    .report(Diagnostic::malformed(&self.name, raw.trim(), &err));
                ValueState::Default
            }
        }
    }

    /// Resolve through the fallback chain, using `baseline` for the default.
    pub fn read(&self, baseline: T) -> T {
        match self.state() {
            ValueState::Explicit(value) => value,
            ValueState::Global | ValueState::Empty => match &self.global {
                Some(global) => global.read(baseline),
                None => baseline,
            },
            ValueState::Default => baseline,
        }
    }

    /// Resolve against the default captured at bind time.
    pub fn value(&self) -> T {
        self.read(self.default.clone())
    }

    /// The default captured at bind time.
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Overwrite `current` unless this value is at its default.
    ///
    /// Returns `true` when the value is in a default state (`current` left
    /// alone for [`ValueState::Default`], or refreshed from the global tier
    /// for an empty binding). This reports "is default", not "unchanged".
    pub fn try_set(&self, current: &mut T) -> bool {
        match self.state() {
            ValueState::Default => true,
            _ => {
                *current = self.read(current.clone());
                self.is_default()
            }
        }
    }

    /// The value an operator put in place at this tier or the global tier,
    /// and which tier it came from. `None` means the baseline stands.
    pub fn override_value(&self) -> Option<(T, TierSource)> {
        match self.state() {
            ValueState::Explicit(value) if self.supports_global => Some((value, TierSource::Level)),
            ValueState::Explicit(value) => Some((value, TierSource::Global)),
            ValueState::Global | ValueState::Empty => {
                self.global.as_ref().and_then(|g| g.override_value())
            }
            ValueState::Default => None,
        }
    }

    /// Write a new stored string through the backing store.
    pub fn set_stored(&self, text: &str) -> Result<()> {
        match &self.binding {
            Binding::Bound { store, entry } => store.write_string(entry, text),
            Binding::Empty => anyhow::bail!("{} is not bound to a store", self.name),
        }
    }

    pub fn entry(&self) -> Option<&EntryKey> {
        match &self.binding {
            Binding::Bound { entry, .. } => Some(entry),
            Binding::Empty => None,
        }
    }
}

impl<T: ConfigValue> Tunable for ValueSource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_default(&self) -> bool {
        matches!(self.state(), ValueState::Default | ValueState::Empty)
    }

    fn is_locally_set(&self) -> bool {
        matches!(self.state(), ValueState::Explicit(_))
    }

    fn validate(&self) -> Result<(), ValueError> {
        let Binding::Bound { store, entry } = &self.binding else {
            return Ok(());
        };
        let raw = store.read_string(entry).unwrap_or_default();
        classify::<T>(&raw, self.supports_global).map(|_| ())
    }
}

fn classify<T: ConfigValue>(raw: &str, supports_global: bool) -> Result<ValueState<T>, ValueError> {
    let text = raw.trim();
    if text.eq_ignore_ascii_case(DEFAULT_TOKEN) {
        return Ok(ValueState::Default);
    }
    if text.is_empty() {
        return Ok(if supports_global {
            ValueState::Global
        } else {
            ValueState::Default
        });
    }
    if supports_global && text.eq_ignore_ascii_case(GLOBAL_TOKEN) {
        return Ok(ValueState::Global);
    }
    T::parse_stored(text).map(ValueState::Explicit)
}

/// Description written next to each stored entry.
pub fn describe<T: ConfigValue>(description: &str, default: &T, supports_global: bool) -> String {
    let tokens = if supports_global {
        format!("{}, {}", DEFAULT_TOKEN, GLOBAL_TOKEN)
    } else {
        DEFAULT_TOKEN.to_string()
    };
    format!(
        "{}\nDefault value: {}\nAlternate accepted values: {}",
        description,
        default.render(),
        tokens
    )
}

/// Binds values for one store section.
///
/// Carries the injected store and diagnostics channel plus the tier being
/// built. A disabled binder produces empty values without touching the store.
#[derive(Debug, Clone)]
pub struct Binder {
    store: Arc<dyn SettingsStore>,
    diagnostics: Diagnostics,
    tier: Tier,
    section: String,
    enabled: bool,
    enabled_default: bool,
}

impl Binder {
    pub fn new(store: Arc<dyn SettingsStore>, diagnostics: Diagnostics, tier: Tier) -> Self {
        let section = tier.section().to_string();
        Self {
            store,
            diagnostics,
            tier,
            section,
            enabled: true,
            enabled_default: false,
        }
    }

    /// Initial value written for group `Enabled` toggles.
    pub fn with_enabled_default(mut self, enabled: bool) -> Self {
        self.enabled_default = enabled;
        self
    }

    /// Binder for a nested section, e.g. `Titan.Enemies.Flowerman`.
    pub fn child(&self, name: &str) -> Self {
        let mut child = self.clone();
        child.section = format!("{}.{}", self.section, name);
        child
    }

    /// Same section, but producing empty values when `enabled` is false.
    pub fn enabled(&self, enabled: bool) -> Self {
        let mut binder = self.clone();
        binder.enabled = self.enabled && enabled;
        binder
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn tier(&self) -> &Tier {
        &self.tier
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Bind one value. `field` is the snake_case field name.
    ///
    /// `global` is the matching global-tier value; it is ignored for the
    /// global tier itself.
    pub fn bind<T: ConfigValue>(
        &self,
        field: &str,
        description: &str,
        default: T,
        global: Option<&Arc<ValueSource<T>>>,
    ) -> Result<Arc<ValueSource<T>>> {
        let key = field.to_upper_camel_case();
        let name = format!("{}.{}", self.section, key);
        let supports_global = self.tier.supports_global();
        let global = if supports_global { global.cloned() } else { None };

        // A disabled group carries only its baseline.
        if !self.enabled {
            return Ok(Arc::new(ValueSource::empty(name, default, None)));
        }

        let stored_default = if supports_global {
            GLOBAL_TOKEN
        } else {
            DEFAULT_TOKEN
        };
        let entry = self.store.bind(
            &self.section,
            &key,
            stored_default,
            &describe(description, &default, supports_global),
        )?;

        Ok(Arc::new(ValueSource {
            name,
            binding: Binding::Bound {
                store: Arc::clone(&self.store),
                entry,
            },
            default,
            supports_global,
            global,
            diagnostics: self.diagnostics.clone(),
        }))
    }

    /// Bind the `Enabled` toggle of the group at this section.
    ///
    /// Always false under a disabled binder.
    pub fn group_enabled(&self, description: &str) -> Result<bool> {
        Ok(self.enabled && self.flag("enabled", description, self.enabled_default)?)
    }

    /// Bind a plain toggle that has no tiered fallback (e.g. `Enabled`).
    pub fn flag(&self, field: &str, description: &str, default: bool) -> Result<bool> {
        if !self.enabled {
            return Ok(default);
        }
        let key = field.to_upper_camel_case();
        let entry = self.store.bind(
            &self.section,
            &key,
            &default.render(),
            &format!("{}\nDefault value: {}", description, default),
        )?;
        let raw = self.store.read_string(&entry).unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(default);
        }
        match bool::parse_stored(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.diagnostics.report(Diagnostic::malformed(
                    &format!("{}.{}", self.section, key),
                    raw.trim(),
                    &err,
                ));
                Ok(default)
            }
        }
    }
}
