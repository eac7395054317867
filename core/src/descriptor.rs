//! Declarative flag descriptors.
//!
//! A [`FlagDescriptor`] describes one command-line flag: its name, alias,
//! help text, value and default, which constructor builds it, and which
//! commands it is defined on. Descriptors are pure data apart from the
//! write-once cache holding the materialized [`Flag`](crate::Flag).

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::{ConstructionOp, Flag, FlagValue};

/// Declarative description of a single flag.
///
/// Use the typed constructors ([`string`](Self::string),
/// [`boolean`](Self::boolean), [`string_slice`](Self::string_slice),
/// [`value`](Self::value)) and chain builder methods.
///
/// # Examples
///
/// ```
/// use redhawk_flags::{FlagDescriptor, FlagValue};
///
/// let all = FlagDescriptor::boolean("all", false)
///     .with_shorthand('A')
///     .with_usage("Apply all regions of provider for command")
///     .defined_on(["list"]);
///
/// assert_eq!(all.operation(), "BoolVar");
/// assert!(all.applies_to("list"));
/// assert!(!all.applies_to("scan"));
/// assert_eq!(all.default_for("list"), &FlagValue::Bool(false));
/// ```
#[derive(Debug, Clone)]
pub struct FlagDescriptor {
    name: String,
    shorthand: Option<char>,
    usage: String,
    value: FlagValue,
    default: FlagValue,
    per_command_defaults: BTreeMap<String, FlagValue>,
    operation: String,
    defined_on: Vec<String>,
    hidden: bool,
    materialized: OnceLock<Arc<Flag>>,
}

impl FlagDescriptor {
    fn with_op(name: &str, value: FlagValue, default: FlagValue, op: ConstructionOp) -> Self {
        Self {
            name: name.to_string(),
            shorthand: None,
            usage: String::new(),
            value,
            default,
            per_command_defaults: BTreeMap::new(),
            operation: op.name().to_string(),
            defined_on: Vec::new(),
            hidden: false,
            materialized: OnceLock::new(),
        }
    }

    /// A string flag built with `StringVar`.
    pub fn string(name: &str, default: &str) -> Self {
        Self::with_op(
            name,
            FlagValue::from(default),
            FlagValue::from(default),
            ConstructionOp::StringVar,
        )
    }

    /// A boolean switch built with `BoolVar`.
    pub fn boolean(name: &str, default: bool) -> Self {
        Self::with_op(
            name,
            FlagValue::Bool(default),
            FlagValue::Bool(default),
            ConstructionOp::BoolVar,
        )
    }

    /// A comma-delimited list flag built with `StringSliceVar`.
    pub fn string_slice(name: &str, default: Vec<String>) -> Self {
        Self::with_op(
            name,
            FlagValue::StrList(default.clone()),
            FlagValue::StrList(default),
            ConstructionOp::StringSliceVar,
        )
    }

    /// A flag whose value container is already constructed (`Var`); the
    /// container's content doubles as the default.
    pub fn value(name: &str, value: FlagValue) -> Self {
        Self::with_op(name, value.clone(), value, ConstructionOp::Var)
    }

    pub fn with_shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = Some(shorthand);
        self
    }

    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Overrides the symbolic construction operation.
    ///
    /// The name is resolved at materialization time, so a misspelled
    /// operation fails at startup rather than here.
    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = operation.to_string();
        self
    }

    /// Uses a different default when bound to `command`.
    pub fn with_default_for(mut self, command: &str, default: impl Into<FlagValue>) -> Self {
        self.per_command_defaults
            .insert(command.to_string(), default.into());
        self
    }

    /// Adds commands this flag is defined on.
    pub fn defined_on<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defined_on.extend(commands.into_iter().map(Into::into));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shorthand(&self) -> Option<char> {
        self.shorthand
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Initial content of the value container.
    pub fn value_container(&self) -> &FlagValue {
        &self.value
    }

    pub fn default_value(&self) -> &FlagValue {
        &self.default
    }

    pub fn per_command_defaults(&self) -> &BTreeMap<String, FlagValue> {
        &self.per_command_defaults
    }

    /// Symbolic construction operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn commands(&self) -> &[String] {
        &self.defined_on
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns `true` if this flag is defined on `command`.
    pub fn applies_to(&self, command: &str) -> bool {
        self.defined_on.iter().any(|c| c == command)
    }

    /// Effective default on `command`: the per-command override when one
    /// exists, otherwise the descriptor default.
    pub fn default_for(&self, command: &str) -> &FlagValue {
        self.per_command_defaults
            .get(command)
            .unwrap_or(&self.default)
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized.get().is_some()
    }

    pub(crate) fn materialized_slot(&self) -> &OnceLock<Arc<Flag>> {
        &self.materialized
    }
}
