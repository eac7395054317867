//! Concrete flags and the flag sets they attach to.
//!
//! A [`Flag`] is the parser-facing form of a descriptor: it owns the
//! [`clap::Arg`] that the command tree renders, plus enough metadata to read
//! the parsed value back out of [`ArgMatches`]. A [`FlagSet`] is an ordered,
//! name-unique collection of shared flags and exposes one named constructor
//! per flag kind.

use std::sync::Arc;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches};
use tracing::trace;

use crate::error::{ConfigurationError, Result};
use crate::{FlagKind, FlagValue};

/// A parsed flag handed to the configuration store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFlag {
    /// Value supplied on the command line, or the effective default.
    pub value: FlagValue,
    /// `true` when the user supplied the flag explicitly.
    pub changed: bool,
}

/// A concrete flag ready to attach to a command.
#[derive(Debug, Clone)]
pub struct Flag {
    name: String,
    kind: FlagKind,
    usage: String,
    default: FlagValue,
    shorthand: Option<char>,
    hidden: bool,
    arg: Arg,
}

impl Flag {
    fn new(name: &str, default: FlagValue, usage: &str, arg: Arg) -> Self {
        Self {
            name: name.to_string(),
            kind: default.kind(),
            usage: usage.to_string(),
            default,
            shorthand: None,
            hidden: false,
            arg: arg.long(name.to_string()).help(usage.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// The default recorded when the flag was constructed.
    pub fn default_value(&self) -> &FlagValue {
        &self.default
    }

    pub fn shorthand(&self) -> Option<char> {
        self.shorthand
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Sets or clears the single-character alias.
    pub fn set_shorthand(&mut self, shorthand: Option<char>) {
        self.shorthand = shorthand;
        self.arg = self.arg.clone().short(shorthand);
    }

    /// Hides the flag from help output.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        self.arg = self.arg.clone().hide(hidden);
    }

    /// Renders the clap argument, showing `default` in help when it is
    /// meaningful for the flag's kind.
    pub fn to_arg(&self, default: &FlagValue) -> Arg {
        let arg = self.arg.clone();
        match default {
            FlagValue::Str(s) if !s.is_empty() => arg.default_value(s.clone()),
            FlagValue::StrList(items) if !items.is_empty() => {
                arg.default_values(items.iter().cloned())
            }
            _ => arg,
        }
    }

    /// Reads this flag's parsed-or-default value out of `matches`.
    ///
    /// `default` is the effective default on the command that owns the
    /// flag. A flag unknown to `matches` reports that default as unchanged.
    pub fn read(&self, matches: &ArgMatches, default: &FlagValue) -> ParsedFlag {
        let changed = matches
            .try_contains_id(&self.name)
            .unwrap_or(false)
            && matches.value_source(&self.name) == Some(ValueSource::CommandLine);

        if !changed {
            return ParsedFlag {
                value: default.clone(),
                changed,
            };
        }

        let value = match self.kind {
            FlagKind::String => matches
                .try_get_one::<String>(&self.name)
                .ok()
                .flatten()
                .map(|s| FlagValue::Str(s.clone())),
            FlagKind::Bool => matches
                .try_get_one::<bool>(&self.name)
                .ok()
                .flatten()
                .map(|b| FlagValue::Bool(*b)),
            FlagKind::StringSlice => matches
                .try_get_many::<String>(&self.name)
                .ok()
                .flatten()
                .map(|items| FlagValue::StrList(items.cloned().collect())),
        };

        trace!(flag = %self.name, ?value, "Read flag from command line");
        ParsedFlag {
            value: value.unwrap_or_else(|| default.clone()),
            changed,
        }
    }
}

/// An ordered set of flags with unique names.
///
/// # Examples
///
/// ```
/// use redhawk_flags::FlagSet;
///
/// let mut set = FlagSet::new("list");
/// set.string_var("region", "", "Run command to specific region").unwrap();
/// set.bool_var("detail", false, "detailed options for scanning").unwrap();
///
/// assert_eq!(set.names(), vec!["region", "detail"]);
/// assert!(set.lookup("detail").is_some());
/// assert!(set.string_var("region", "", "again").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    name: String,
    flags: Vec<Arc<Flag>>,
}

impl FlagSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches an already-built flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateFlag`] when a flag with the same
    /// name is already attached.
    pub fn add_flag(&mut self, flag: Arc<Flag>) -> Result<()> {
        if self.lookup(flag.name()).is_some() {
            return Err(ConfigurationError::DuplicateFlag(flag.name().to_string()));
        }
        self.flags.push(flag);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<Flag>> {
        self.flags.iter().find(|f| f.name() == name)
    }

    /// Removes and returns the named flag.
    pub fn take(&mut self, name: &str) -> Option<Arc<Flag>> {
        let index = self.flags.iter().position(|f| f.name() == name)?;
        Some(self.flags.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Flag>> {
        self.flags.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.flags.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Defines a string flag.
    pub fn string_var(&mut self, name: &str, default: &str, usage: &str) -> Result<()> {
        let arg = Arg::new(name.to_string())
            .action(ArgAction::Set)
            .value_name("STRING");
        self.add_flag(Arc::new(Flag::new(name, FlagValue::from(default), usage, arg)))
    }

    /// Defines a boolean switch. `--name` sets it; `--name=false` clears a
    /// switch that defaults to on.
    pub fn bool_var(&mut self, name: &str, default: bool, usage: &str) -> Result<()> {
        let arg = Arg::new(name.to_string())
            .action(ArgAction::Set)
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(clap::value_parser!(bool))
            .value_name("BOOL");
        self.add_flag(Arc::new(Flag::new(name, FlagValue::Bool(default), usage, arg)))
    }

    /// Defines a comma-delimited, repeatable string list flag.
    pub fn string_slice_var(&mut self, name: &str, default: Vec<String>, usage: &str) -> Result<()> {
        let arg = Arg::new(name.to_string())
            .action(ArgAction::Append)
            .value_delimiter(',')
            .value_name("STRINGS");
        self.add_flag(Arc::new(Flag::new(
            name,
            FlagValue::StrList(default),
            usage,
            arg,
        )))
    }

    /// Defines a flag from an already-constructed value; its current
    /// content becomes the default and its kind selects the primitive.
    pub fn var(&mut self, value: FlagValue, name: &str, usage: &str) -> Result<()> {
        match value {
            FlagValue::Str(s) => self.string_var(name, &s, usage),
            FlagValue::Bool(b) => self.bool_var(name, b, usage),
            FlagValue::StrList(items) => self.string_slice_var(name, items, usage),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Command;

    use super::*;

    fn parse(set: &FlagSet, argv: &[&str]) -> ArgMatches {
        let mut cmd = Command::new("list");
        for flag in set.iter() {
            cmd = cmd.arg(flag.to_arg(flag.default_value()));
        }
        cmd.try_get_matches_from(argv).unwrap()
    }

    #[test]
    fn test_read_default_when_absent() {
        let mut set = FlagSet::new("list");
        set.string_var("output", "table", "output format").unwrap();
        let matches = parse(&set, &["list"]);

        let flag = set.lookup("output").unwrap();
        let parsed = flag.read(&matches, flag.default_value());
        assert_eq!(parsed.value, FlagValue::from("table"));
        assert!(!parsed.changed);
    }

    #[test]
    fn test_read_supplied_string() {
        let mut set = FlagSet::new("list");
        set.string_var("output", "table", "output format").unwrap();
        let matches = parse(&set, &["list", "--output", "json"]);

        let flag = set.lookup("output").unwrap();
        let parsed = flag.read(&matches, flag.default_value());
        assert_eq!(parsed.value, FlagValue::from("json"));
        assert!(parsed.changed);
    }

    #[test]
    fn test_shorthand_and_bool() {
        let mut set = FlagSet::new("list");
        set.bool_var("all", false, "all regions").unwrap();
        let mut flag = (**set.lookup("all").unwrap()).clone();
        flag.set_shorthand(Some('A'));
        let mut set = FlagSet::new("list");
        set.add_flag(Arc::new(flag)).unwrap();

        let matches = parse(&set, &["list", "-A"]);
        let flag = set.lookup("all").unwrap();
        assert_eq!(flag.shorthand(), Some('A'));
        assert_eq!(
            flag.read(&matches, flag.default_value()).value,
            FlagValue::Bool(true)
        );
    }

    #[test]
    fn test_bool_defaulting_to_true_can_be_cleared() {
        let mut set = FlagSet::new("list");
        set.bool_var("color", true, "colored output").unwrap();
        let flag = set.lookup("color").unwrap();

        let cleared = flag.read(&parse(&set, &["list", "--color=false"]), flag.default_value());
        assert_eq!(cleared.value, FlagValue::Bool(false));
        assert!(cleared.changed);

        let bare = flag.read(&parse(&set, &["list", "--color"]), flag.default_value());
        assert_eq!(bare.value, FlagValue::Bool(true));
        assert!(bare.changed);

        let absent = flag.read(&parse(&set, &["list"]), flag.default_value());
        assert_eq!(absent.value, FlagValue::Bool(true));
        assert!(!absent.changed);
    }

    #[test]
    fn test_bool_rejects_non_boolean_value() {
        let mut set = FlagSet::new("list");
        set.bool_var("detail", false, "detail").unwrap();
        let mut cmd = Command::new("list");
        for flag in set.iter() {
            cmd = cmd.arg(flag.to_arg(flag.default_value()));
        }
        assert!(cmd.try_get_matches_from(["list", "--detail=maybe"]).is_err());
    }

    #[test]
    fn test_string_slice_splits_on_comma() {
        let mut set = FlagSet::new("list");
        set.string_slice_var("regions", Vec::new(), "regions").unwrap();
        let matches = parse(&set, &["list", "--regions", "a,b", "--regions", "c"]);

        let flag = set.lookup("regions").unwrap();
        assert_eq!(
            flag.read(&matches, flag.default_value()).value,
            FlagValue::StrList(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_read_unknown_to_matches_falls_back_to_default() {
        let mut set = FlagSet::new("list");
        set.bool_var("detail", false, "detail").unwrap();
        let matches = Command::new("other").try_get_matches_from(["other"]).unwrap();

        let flag = set.lookup("detail").unwrap();
        let parsed = flag.read(&matches, &FlagValue::Bool(false));
        assert_eq!(parsed.value, FlagValue::Bool(false));
        assert!(!parsed.changed);
    }

    #[test]
    fn test_var_uses_value_as_default() {
        let mut set = FlagSet::new("list");
        set.var(FlagValue::from("yaml"), "output", "format").unwrap();
        let flag = set.lookup("output").unwrap();
        assert_eq!(flag.kind(), FlagKind::String);
        assert_eq!(flag.default_value(), &FlagValue::from("yaml"));
    }
}
