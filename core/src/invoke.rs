//! Name-based dispatch to flag-set constructors.
//!
//! Descriptors name their constructor symbolically (`"StringVar"`,
//! `"BoolVar"`, ...). [`CONSTRUCTORS`] maps each name to a typed
//! [`ConstructionOp`] and the function that drives the matching
//! [`FlagSet`] constructor. Supporting a new flag kind means adding one
//! variant and one table row; the binder never changes.

use std::fmt;

use crate::error::{ConfigurationError, Result};
use crate::{FlagKind, FlagSet, FlagValue};

/// Which primitive constructor builds a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructionOp {
    /// `FlagSet::string_var`.
    StringVar,
    /// `FlagSet::bool_var`.
    BoolVar,
    /// `FlagSet::string_slice_var`.
    StringSliceVar,
    /// `FlagSet::var`: the value container is already fully constructed
    /// and no separate default is passed.
    Var,
}

/// Builds one flag on a flag set from positional arguments.
pub type Constructor = fn(&mut FlagSet, ConstructorArgs) -> Result<()>;

/// Symbolic name and constructor for every supported operation.
pub const CONSTRUCTORS: &[(ConstructionOp, &str, Constructor)] = &[
    (ConstructionOp::StringVar, "StringVar", construct_string),
    (ConstructionOp::BoolVar, "BoolVar", construct_bool),
    (ConstructionOp::StringSliceVar, "StringSliceVar", construct_string_slice),
    (ConstructionOp::Var, "Var", construct_var),
];

impl ConstructionOp {
    /// Resolves a symbolic operation name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownOperation`] for names missing from
    /// [`CONSTRUCTORS`].
    ///
    /// # Examples
    ///
    /// ```
    /// use redhawk_flags::ConstructionOp;
    ///
    /// assert_eq!(ConstructionOp::resolve("region", "StringVar").unwrap(), ConstructionOp::StringVar);
    /// assert!(ConstructionOp::resolve("region", "doesNotExist").is_err());
    /// ```
    pub fn resolve(flag: &str, name: &str) -> Result<Self> {
        CONSTRUCTORS
            .iter()
            .find(|(_, op_name, _)| *op_name == name)
            .map(|(op, _, _)| *op)
            .ok_or_else(|| ConfigurationError::UnknownOperation {
                flag: flag.to_string(),
                operation: name.to_string(),
            })
    }

    pub fn name(self) -> &'static str {
        CONSTRUCTORS
            .iter()
            .find(|(op, _, _)| *op == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Whether the constructor takes a separate default argument.
    pub fn takes_default(self) -> bool {
        self != Self::Var
    }

    /// The value kind this operation builds, or `None` when it follows the
    /// value container.
    pub fn kind(self) -> Option<FlagKind> {
        match self {
            Self::StringVar => Some(FlagKind::String),
            Self::BoolVar => Some(FlagKind::Bool),
            Self::StringSliceVar => Some(FlagKind::StringSlice),
            Self::Var => None,
        }
    }
}

impl fmt::Display for ConstructionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Positional constructor arguments: value container, name, optional
/// default, usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorArgs {
    pub value: FlagValue,
    pub name: String,
    pub default: Option<FlagValue>,
    pub usage: String,
}

/// Invokes the constructor registered for `op` on `set`.
pub fn invoke(set: &mut FlagSet, op: ConstructionOp, args: ConstructorArgs) -> Result<()> {
    let (_, _, construct) = CONSTRUCTORS
        .iter()
        .find(|(candidate, _, _)| *candidate == op)
        .ok_or_else(|| ConfigurationError::UnknownOperation {
            flag: args.name.clone(),
            operation: op.to_string(),
        })?;
    construct(set, args)
}

fn mismatch(name: &str, expected: FlagKind, found: FlagKind) -> ConfigurationError {
    ConfigurationError::TypeMismatch {
        flag: name.to_string(),
        expected,
        found,
    }
}

/// Checks the container and returns the default, falling back to the
/// container's content when no default was passed.
fn typed_default(args: &ConstructorArgs, expected: FlagKind) -> Result<FlagValue> {
    if args.value.kind() != expected {
        return Err(mismatch(&args.name, expected, args.value.kind()));
    }
    let default = args.default.clone().unwrap_or_else(|| args.value.clone());
    if default.kind() != expected {
        return Err(mismatch(&args.name, expected, default.kind()));
    }
    Ok(default)
}

fn construct_string(set: &mut FlagSet, args: ConstructorArgs) -> Result<()> {
    match typed_default(&args, FlagKind::String)? {
        FlagValue::Str(default) => set.string_var(&args.name, &default, &args.usage),
        other => Err(mismatch(&args.name, FlagKind::String, other.kind())),
    }
}

fn construct_bool(set: &mut FlagSet, args: ConstructorArgs) -> Result<()> {
    match typed_default(&args, FlagKind::Bool)? {
        FlagValue::Bool(default) => set.bool_var(&args.name, default, &args.usage),
        other => Err(mismatch(&args.name, FlagKind::Bool, other.kind())),
    }
}

fn construct_string_slice(set: &mut FlagSet, args: ConstructorArgs) -> Result<()> {
    match typed_default(&args, FlagKind::StringSlice)? {
        FlagValue::StrList(default) => set.string_slice_var(&args.name, default, &args.usage),
        other => Err(mismatch(&args.name, FlagKind::StringSlice, other.kind())),
    }
}

fn construct_var(set: &mut FlagSet, args: ConstructorArgs) -> Result<()> {
    set.var(args.value, &args.name, &args.usage)
}
