//! The configuration store that parsed flags are pushed into.
//!
//! Downstream logic reads resolved settings from a [`ConfigStore`] instead of
//! from argument matches. The store is layered: registered defaults at the
//! bottom, flag values pushed by pre-run hooks on top.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{FlagValue, ParsedFlag};

/// Receiver of parsed flag values.
pub trait ConfigSink {
    /// Adopts `flag` as the flag-layer value for `name`. Called once per
    /// owned flag per invocation.
    fn push_flag_value(&mut self, name: &str, flag: ParsedFlag);
}

/// Layered key-value store of resolved settings.
///
/// # Examples
///
/// ```
/// use redhawk_flags::{ConfigSink, ConfigStore, FlagValue, ParsedFlag};
///
/// let mut store = ConfigStore::new();
/// store.set_default("output", "yaml");
/// assert_eq!(store.get_str("output"), Some("yaml"));
///
/// store.push_flag_value("output", ParsedFlag { value: FlagValue::from("json"), changed: true });
/// assert_eq!(store.get_str("output"), Some("json"));
/// assert!(store.is_set_by_flag("output"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    defaults: BTreeMap<String, FlagValue>,
    flags: BTreeMap<String, ParsedFlag>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fallback for `key`, below the flag layer.
    pub fn set_default(&mut self, key: &str, value: impl Into<FlagValue>) {
        self.defaults.insert(key.to_string(), value.into());
    }

    /// Resolved value for `key`: the flag layer wins over defaults.
    pub fn get(&self, key: &str) -> Option<&FlagValue> {
        self.flags
            .get(key)
            .map(|flag| &flag.value)
            .or_else(|| self.defaults.get(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FlagValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FlagValue::as_bool)
    }

    pub fn get_str_list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(FlagValue::as_str_list)
    }

    /// `true` when `key` came from a flag the user actually passed.
    pub fn is_set_by_flag(&self, key: &str) -> bool {
        self.flags.get(key).is_some_and(|flag| flag.changed)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Flattened view of every resolved key.
    pub fn snapshot(&self) -> BTreeMap<String, FlagValue> {
        let mut merged = self.defaults.clone();
        for (key, flag) in &self.flags {
            merged.insert(key.clone(), flag.value.clone());
        }
        merged
    }
}

impl ConfigSink for ConfigStore {
    fn push_flag_value(&mut self, name: &str, flag: ParsedFlag) {
        trace!(key = name, value = %flag.value, changed = flag.changed, "Bound flag value");
        self.flags.insert(name.to_string(), flag);
    }
}
