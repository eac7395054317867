//! Attaching registry flags to commands and chaining pre-run hooks.
//!
//! Binding a command attaches every registry flag defined on it, in registry
//! order, and installs a pre-run hook that pushes those flags' values into the
//! configuration store. The installed hook then runs the hook it replaced on
//! the same command, followed by the nearest ancestor's hook, so installing a
//! hook on a child never masks its parent's.
//!
//! Value push happens before the ancestor hook runs. When the ancestor hook
//! fails, the child's values are already in the store, but the error is
//! returned unchanged and the command body does not run.
//!
//! Each hook reads its flags from the part of the command line that belongs
//! to the command it was installed on, so `redhawk aws --profile prod ec2`
//! pushes `prod`. When an ancestor and a descendant on the invoked path both
//! own a flag, the descendant's value stands unless only the ancestor's was
//! given on the command line.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{ConfigurationError, Result};
use crate::validate::{check_attachable, validate_registry};
use crate::{
    CommandId, CommandTree, Flag, FlagRegistry, FlagValue, HookContext, ParsedFlag, PreRunHook,
};

/// A flag attached to a command along with its effective default there.
#[derive(Debug, Clone)]
struct OwnedFlag {
    flag: Arc<Flag>,
    default: FlagValue,
}

/// Wires registry flags into a [`CommandTree`].
///
/// # Examples
///
/// ```
/// use redhawk_flags::{CommandFlagBinder, CommandTree, ConfigStore, FlagRegistry};
///
/// let registry = FlagRegistry::redhawk();
/// let mut tree = CommandTree::new("redhawk");
/// let list = tree.add_command(tree.root(), "list", None);
/// CommandFlagBinder::new(&registry).bind(&mut tree, list).unwrap();
///
/// let mut store = ConfigStore::new();
/// tree.execute(["redhawk", "list", "-A"], &mut store).unwrap();
/// assert_eq!(store.get_bool("all"), Some(true));
/// assert_eq!(store.get_str("output"), Some("table"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CommandFlagBinder<'r> {
    registry: &'r FlagRegistry,
}

impl<'r> CommandFlagBinder<'r> {
    pub fn new(registry: &'r FlagRegistry) -> Self {
        Self { registry }
    }

    /// Binds one command; returns the number of flags attached.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::AlreadyBound`] when `command` was bound before,
    /// a reserved or duplicate shorthand or name among its flags, and any
    /// materialization or attachment error. Reserved names and shorthands
    /// are checked before anything is attached.
    pub fn bind(&self, tree: &mut CommandTree, command: CommandId) -> Result<usize> {
        let name = tree.name(command).to_string();
        if tree.is_bound(command) {
            return Err(ConfigurationError::AlreadyBound(name));
        }
        check_attachable(&name, tree.flags(command), self.registry.for_command(&name))?;
        tree.mark_bound(command);

        let mut owned = Vec::new();
        for descriptor in self.registry.for_command(&name) {
            let flag = descriptor.materialize()?;
            let default = descriptor.default_for(&name).clone();
            tree.attach_flag(command, Arc::clone(&flag), default.clone())?;
            owned.push(OwnedFlag { flag, default });
        }

        let attached = owned.len();
        let previous = tree.take_pre_run(command);
        tree.set_pre_run(command, binding_hook(command, owned, previous));
        debug!(command = %name, flags = attached, "Bound command flags");
        Ok(attached)
    }

    /// Validates the registry against `tree`, then binds every command.
    ///
    /// # Errors
    ///
    /// The first [`ConfigurationError`] found by
    /// [`validate_registry`] or raised while binding.
    pub fn bind_all(&self, tree: &mut CommandTree) -> Result<()> {
        if let Some(err) = validate_registry(self.registry, tree).into_iter().next() {
            return Err(err);
        }
        let ids: Vec<CommandId> = tree.ids().collect();
        for id in ids {
            self.bind(tree, id)?;
        }
        Ok(())
    }
}

fn binding_hook(owner: CommandId, owned: Vec<OwnedFlag>, previous: Option<PreRunHook>) -> PreRunHook {
    PreRunHook::fallible(move |ctx| {
        let matches = ctx.matches_for(owner);
        for entry in &owned {
            let parsed = match matches {
                Some(matches) => entry.flag.read(matches, &entry.default),
                None => ParsedFlag {
                    value: entry.default.clone(),
                    changed: false,
                },
            };
            if overridden_below(ctx, owner, entry.flag.name(), parsed.changed) {
                trace!(flag = entry.flag.name(), "Kept value from descendant command");
                continue;
            }
            ctx.sink.push_flag_value(entry.flag.name(), parsed);
        }

        if let Some(previous) = &previous {
            previous.call(ctx)?;
        }

        let tree = ctx.tree;
        let Some(parent) = tree.parent(owner) else {
            return Ok(());
        };
        match tree.nearest_pre_run(parent) {
            Some((ancestor, PreRunHook::Fallible(hook))) => {
                trace!(ancestor = tree.name(ancestor), "Chaining to ancestor hook");
                hook(ctx)
            }
            // Best effort: this shape has no way to report failure.
            Some((ancestor, PreRunHook::Infallible(hook))) => {
                trace!(ancestor = tree.name(ancestor), "Chaining to ancestor hook");
                hook(ctx);
                Ok(())
            }
            None => Ok(()),
        }
    })
}

/// Whether a command between the invoked one and `owner` also owns `name`
/// and its value takes precedence over the owner's.
fn overridden_below(ctx: &HookContext<'_>, owner: CommandId, name: &str, changed: bool) -> bool {
    let tree = ctx.tree;
    let mut current = Some(ctx.command);
    while let Some(id) = current {
        if id == owner {
            return false;
        }
        if let Some(flag) = tree.flags(id).lookup(name) {
            if !changed {
                return true;
            }
            let set_below = ctx
                .matches_for(id)
                .is_some_and(|matches| flag.read(matches, tree.node(id).flag_default(flag)).changed);
            if set_below {
                return true;
            }
        }
        current = tree.parent(id);
    }
    false
}
