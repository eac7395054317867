//! Registry validation.
//!
//! Catches registry mistakes (duplicate names, unresolvable construction
//! operations, kind mismatches, commands missing from the tree, clashes with
//! the parser's own `--help`/`--version` arguments) before any command is
//! bound or run.
//!
//! # Examples
//!
//! ```
//! use redhawk_flags::*;
//!
//! let mut tree = CommandTree::new("redhawk");
//! tree.add_command(tree.root(), "list", None);
//! assert!(validate_registry(&FlagRegistry::redhawk(), &tree).is_empty());
//!
//! // A flag defined on a command the tree does not have
//! let registry = FlagRegistry::new()
//!     .with(FlagDescriptor::boolean("force", false).defined_on(["delete"]));
//! assert!(!validate_registry(&registry, &tree).is_empty());
//! ```

use std::collections::HashSet;

use crate::command::POSITIONAL_ARGS;
use crate::error::{ConfigurationError, Result};
use crate::{CommandTree, ConstructionOp, FlagDescriptor, FlagRegistry, FlagSet};

/// Argument ids clap or the command tree define on their own.
const RESERVED_NAMES: [&str; 3] = ["help", "version", POSITIONAL_ARGS];

/// Shorthands of clap's generated help and version flags.
const RESERVED_SHORTHANDS: [char; 2] = ['h', 'V'];

/// Validates every descriptor of `registry` against `tree`.
///
/// Returns an empty list when the registry is sound; stops at the first
/// problem otherwise.
pub fn validate_registry(registry: &FlagRegistry, tree: &CommandTree) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for descriptor in registry {
        let name = descriptor.name();
        if name.trim().is_empty() {
            errors.push(ConfigurationError::EmptyFlagName);
            return errors;
        }
        if !seen.insert(name) {
            errors.push(ConfigurationError::DuplicateFlag(name.to_string()));
            return errors;
        }

        errors.extend(validate_descriptor(descriptor, tree));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors.extend(validate_shorthands(registry, tree));
    errors
}

fn validate_descriptor(descriptor: &FlagDescriptor, tree: &CommandTree) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();
    let name = descriptor.name();

    let op = match ConstructionOp::resolve(name, descriptor.operation()) {
        Ok(op) => op,
        Err(err) => {
            errors.push(err);
            return errors;
        }
    };

    let expected = op
        .kind()
        .unwrap_or_else(|| descriptor.value_container().kind());
    let values = std::iter::once(descriptor.value_container())
        .chain(std::iter::once(descriptor.default_value()))
        .chain(descriptor.per_command_defaults().values());
    for value in values {
        if value.kind() != expected {
            errors.push(ConfigurationError::TypeMismatch {
                flag: name.to_string(),
                expected,
                found: value.kind(),
            });
            return errors;
        }
    }

    if descriptor.commands().is_empty() {
        errors.push(ConfigurationError::NoCommands(name.to_string()));
        return errors;
    }
    for command in descriptor.commands() {
        if tree.find(command).is_none() {
            errors.push(ConfigurationError::UnknownCommand {
                flag: name.to_string(),
                command: command.clone(),
            });
            return errors;
        }
    }

    errors
}

fn validate_shorthands(registry: &FlagRegistry, tree: &CommandTree) -> Vec<ConfigurationError> {
    let empty = FlagSet::default();
    tree.ids()
        .map(|id| tree.name(id))
        .find_map(|command| check_attachable(command, &empty, registry.for_command(command)).err())
        .into_iter()
        .collect()
}

/// Checks descriptors about to be attached to `command` against the
/// parser's reserved arguments, the flags already in `attached` and each
/// other.
pub(crate) fn check_attachable<'a>(
    command: &str,
    attached: &FlagSet,
    descriptors: impl IntoIterator<Item = &'a FlagDescriptor>,
) -> Result<()> {
    let mut seen: HashSet<char> = attached.iter().filter_map(|flag| flag.shorthand()).collect();

    for descriptor in descriptors {
        let name = descriptor.name();
        if RESERVED_NAMES.contains(&name) {
            return Err(ConfigurationError::ReservedName(name.to_string()));
        }
        let Some(shorthand) = descriptor.shorthand() else {
            continue;
        };
        if RESERVED_SHORTHANDS.contains(&shorthand) {
            return Err(ConfigurationError::ReservedShorthand {
                flag: name.to_string(),
                shorthand,
            });
        }
        if !seen.insert(shorthand) {
            return Err(ConfigurationError::DuplicateShorthand {
                command: command.to_string(),
                shorthand,
            });
        }
    }

    Ok(())
}
