//! Error types for flag registration, binding and invocation.
//!
//! Registration problems are [`ConfigurationError`]s and surface while the
//! command tree is wired, before anything runs. Pre-run hook failures are
//! [`HookError`]s and abort a single invocation.

use thiserror::Error;

use crate::FlagKind;

/// Startup-fatal misconfiguration of the flag registry or command tree.
///
/// These indicate a programming mistake in the registry, never bad user
/// input, so callers should abort before any command runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A descriptor has an empty or whitespace-only name.
    #[error("flag name cannot be empty")]
    EmptyFlagName,

    /// Two flags share a name in the registry or in one flag set.
    #[error("duplicate flag: {0}")]
    DuplicateFlag(String),

    /// Two flags attached to the same command share a shorthand.
    #[error("duplicate shorthand -{shorthand} on command {command}")]
    DuplicateShorthand { command: String, shorthand: char },

    /// The construction operation does not name a known flag constructor.
    #[error("construction operation not found for flag {flag}: {operation}")]
    UnknownOperation { flag: String, operation: String },

    /// The value or default does not have the kind the operation expects.
    #[error("flag {flag} expects a {expected} value, got {found}")]
    TypeMismatch {
        flag: String,
        expected: FlagKind,
        found: FlagKind,
    },

    /// A descriptor applies to no command at all.
    #[error("flag {0} is not defined on any command")]
    NoCommands(String),

    /// A descriptor names a command that is not in the command tree.
    #[error("flag {flag} references unknown command: {command}")]
    UnknownCommand { flag: String, command: String },

    /// A command was handed to the binder a second time.
    #[error("command already bound: {0}")]
    AlreadyBound(String),

    /// A flag name collides with an argument the parser generates itself.
    #[error("flag name {0} is reserved")]
    ReservedName(String),

    /// A shorthand collides with `-h` or `-V`.
    #[error("shorthand -{shorthand} of flag {flag} is reserved")]
    ReservedShorthand { flag: String, shorthand: char },

    /// A resolved constructor ran but did not define the requested flag.
    #[error("construction operation {operation} did not define flag {flag}")]
    FlagNotConstructed { flag: String, operation: String },
}

/// Failure reported by a pre-run hook.
///
/// Chained hooks return the parent's error unchanged, so the error seen by
/// the caller compares equal to the one the failing hook produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// A hook rejected the invocation of `command`.
    #[error("pre-run hook for {command} failed: {message}")]
    Failed { command: String, message: String },
}

impl HookError {
    /// Shorthand for [`HookError::Failed`].
    pub fn failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Errors from parsing and preparing a single invocation.
#[derive(Debug, Error)]
pub enum RunError {
    /// The argument parser rejected the command line (includes help/version
    /// requests, which clap reports as errors).
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// A pre-run hook in the chain failed.
    #[error(transparent)]
    Hook(#[from] HookError),
}

/// Convenience alias for results with [`ConfigurationError`].
pub type Result<T> = std::result::Result<T, ConfigurationError>;
