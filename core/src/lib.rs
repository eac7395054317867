//! Declarative flag registration for the `redhawk` command line.
//!
//! A single [`FlagRegistry`] describes every flag the program knows about.
//! Each command opts into a subset of it, and one generic code path builds
//! flags of every kind:
//!
//! - [`FlagDescriptor`]: a declarative record of one flag (name, shorthand,
//!   usage, value, default, construction operation, commands, visibility).
//! - [`FlagDescriptor::materialize`]: builds the concrete [`Flag`] once and
//!   caches it on the descriptor.
//! - [`ConstructionOp`] and [`CONSTRUCTORS`]: the table that maps a symbolic
//!   operation name such as `"StringVar"` to the [`FlagSet`] constructor for
//!   that flag kind.
//! - [`CommandFlagBinder`]: attaches a command's flags and installs a
//!   [`PreRunHook`] that pushes their values into a [`ConfigSink`] and then
//!   defers to the ancestor's hook.
//! - [`CommandTree`]: the command hierarchy, rendered to [`clap`] for
//!   parsing.
//!
//! Misconfigured registries are reported as [`ConfigurationError`]s at
//! startup ([`validate_registry`], [`CommandFlagBinder::bind_all`]); hook
//! failures are [`HookError`]s that abort a single invocation.
//!
//! # Example
//!
//! ```
//! use redhawk_flags::*;
//!
//! let registry = FlagRegistry::new().with(
//!     FlagDescriptor::string("output", "table")
//!         .with_shorthand('o')
//!         .defined_on(["list"]),
//! );
//!
//! let mut tree = CommandTree::new("redhawk");
//! tree.add_command(tree.root(), "list", Some("List resources"));
//! CommandFlagBinder::new(&registry).bind_all(&mut tree).unwrap();
//!
//! let mut store = ConfigStore::new();
//! let invocation = tree.execute(["redhawk", "list", "-o", "json"], &mut store).unwrap();
//!
//! assert_eq!(invocation.path, vec!["redhawk", "list"]);
//! assert_eq!(store.get_str("output"), Some("json"));
//! ```

mod binder;
mod command;
mod descriptor;
mod error;
mod flag;
mod invoke;
mod materialize;
mod registry;
mod store;
mod validate;
mod value;

pub use binder::CommandFlagBinder;
pub use command::{
    CommandId, CommandNode, CommandTree, FallibleHook, HookContext, InfallibleHook, Invocation,
    PreRunHook,
};
pub use descriptor::FlagDescriptor;
pub use error::{ConfigurationError, HookError, Result, RunError};
pub use flag::{Flag, FlagSet, ParsedFlag};
pub use invoke::{CONSTRUCTORS, ConstructionOp, Constructor, ConstructorArgs, invoke};
pub use registry::{DEFAULT_OUTPUT_FORMAT, FlagRegistry};
pub use store::{ConfigSink, ConfigStore};
pub use validate::validate_registry;
pub use value::{FlagKind, FlagValue};
