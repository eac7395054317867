//! Command tree, pre-run hooks and invocation.
//!
//! The tree is an arena of [`CommandNode`]s addressed by [`CommandId`]. Each
//! node owns a [`FlagSet`] and an optional [`PreRunHook`]. At invocation time
//! the tree is rendered to a [`clap::Command`], the command line is parsed,
//! and the nearest pre-run hook of the invoked command (itself or its closest
//! ancestor that has one) runs before the caller executes the command body.
//!
//! Commands without subcommands accept arbitrary positional arguments, which
//! are handed to hooks and to the caller as [`Invocation::args`].

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches};
use tracing::debug;

use crate::error::{HookError, Result, RunError};
use crate::{ConfigSink, Flag, FlagSet, FlagValue};

/// Id of the hidden argument collecting a leaf command's positionals.
pub(crate) const POSITIONAL_ARGS: &str = "args";

/// Index of a command within its [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(usize);

/// Hook that may reject an invocation.
pub type FallibleHook = Arc<dyn Fn(&mut HookContext<'_>) -> std::result::Result<(), HookError> + Send + Sync>;

/// Hook that cannot report failure.
pub type InfallibleHook = Arc<dyn Fn(&mut HookContext<'_>) + Send + Sync>;

/// A callback run before a command's main logic.
#[derive(Clone)]
pub enum PreRunHook {
    Fallible(FallibleHook),
    Infallible(InfallibleHook),
}

impl PreRunHook {
    pub fn fallible<F>(hook: F) -> Self
    where
        F: Fn(&mut HookContext<'_>) -> std::result::Result<(), HookError> + Send + Sync + 'static,
    {
        Self::Fallible(Arc::new(hook))
    }

    pub fn infallible<F>(hook: F) -> Self
    where
        F: Fn(&mut HookContext<'_>) + Send + Sync + 'static,
    {
        Self::Infallible(Arc::new(hook))
    }

    /// Runs the hook. The infallible shape always succeeds.
    pub fn call(&self, ctx: &mut HookContext<'_>) -> std::result::Result<(), HookError> {
        match self {
            Self::Fallible(hook) => hook(ctx),
            Self::Infallible(hook) => {
                hook(ctx);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for PreRunHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fallible(_) => f.write_str("PreRunHook::Fallible"),
            Self::Infallible(_) => f.write_str("PreRunHook::Infallible"),
        }
    }
}

/// Everything a pre-run hook sees.
pub struct HookContext<'a> {
    /// The tree the invoked command belongs to.
    pub tree: &'a CommandTree,
    /// The command the user invoked (a descendant of the hook's owner when
    /// the hook is inherited).
    pub command: CommandId,
    /// Parsed arguments of the invoked command.
    pub matches: &'a ArgMatches,
    /// Positional arguments of the invoked command.
    pub args: &'a [String],
    /// Destination for flag values.
    pub sink: &'a mut dyn ConfigSink,
    invocation: &'a Invocation,
}

impl<'a> HookContext<'a> {
    /// Parsed arguments given at `id`'s level of the command line.
    ///
    /// `None` when `id` is not on the invoked path.
    pub fn matches_for(&self, id: CommandId) -> Option<&'a ArgMatches> {
        self.invocation.matches_for(id)
    }
}

/// A parsed command line, ready for the command body.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: CommandId,
    /// Command names from the root down to `command`.
    pub path: Vec<String>,
    pub matches: ArgMatches,
    /// Positional arguments given to `command`.
    pub args: Vec<String>,
    /// Matches of every ancestor on the path, root first. Flags given
    /// before a subcommand name live here, not in `matches`.
    ancestors: Vec<(CommandId, ArgMatches)>,
}

impl Invocation {
    pub fn matches_for(&self, id: CommandId) -> Option<&ArgMatches> {
        if id == self.command {
            return Some(&self.matches);
        }
        self.ancestors
            .iter()
            .find(|(ancestor, _)| *ancestor == id)
            .map(|(_, matches)| matches)
    }
}

/// One command in the tree.
#[derive(Debug, Clone)]
pub struct CommandNode {
    name: String,
    about: Option<String>,
    parent: Option<CommandId>,
    children: Vec<CommandId>,
    flags: FlagSet,
    flag_defaults: BTreeMap<String, FlagValue>,
    pre_run: Option<PreRunHook>,
    bound: bool,
}

impl CommandNode {
    fn new(name: &str, about: Option<&str>, parent: Option<CommandId>) -> Self {
        Self {
            name: name.to_string(),
            about: about.map(String::from),
            parent,
            children: Vec::new(),
            flags: FlagSet::new(name),
            flag_defaults: BTreeMap::new(),
            pre_run: None,
            bound: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    pub fn children(&self) -> &[CommandId] {
        &self.children
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn pre_run(&self) -> Option<&PreRunHook> {
        self.pre_run.as_ref()
    }

    /// Effective default of an attached flag on this command.
    pub fn flag_default<'a>(&'a self, flag: &'a Flag) -> &'a FlagValue {
        self.flag_defaults
            .get(flag.name())
            .unwrap_or(flag.default_value())
    }
}

/// Arena of commands rooted at the program command.
///
/// # Examples
///
/// ```
/// use redhawk_flags::CommandTree;
///
/// let mut tree = CommandTree::new("redhawk");
/// let list = tree.add_command(tree.root(), "list", Some("List resources"));
///
/// assert_eq!(tree.parent(list), Some(tree.root()));
/// assert_eq!(tree.find("list"), Some(list));
/// assert_eq!(tree.path(list), vec!["redhawk", "list"]);
/// ```
#[derive(Debug, Clone)]
pub struct CommandTree {
    nodes: Vec<CommandNode>,
    version: Option<String>,
}

impl CommandTree {
    pub fn new(root: &str) -> Self {
        Self {
            nodes: vec![CommandNode::new(root, None, None)],
            version: None,
        }
    }

    /// Sets the version reported by `--version` on the root command.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Sets the root command's description.
    pub fn with_about(mut self, about: &str) -> Self {
        self.nodes[0].about = Some(about.to_string());
        self
    }

    pub fn root(&self) -> CommandId {
        CommandId(0)
    }

    pub fn add_command(&mut self, parent: CommandId, name: &str, about: Option<&str>) -> CommandId {
        let id = CommandId(self.nodes.len());
        self.nodes.push(CommandNode::new(name, about, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: CommandId) -> &CommandNode {
        &self.nodes[id.0]
    }

    pub fn name(&self, id: CommandId) -> &str {
        self.node(id).name()
    }

    pub fn parent(&self, id: CommandId) -> Option<CommandId> {
        self.node(id).parent
    }

    /// All command ids, parents before children.
    pub fn ids(&self) -> impl Iterator<Item = CommandId> + '_ {
        (0..self.nodes.len()).map(CommandId)
    }

    /// First command with the given name.
    pub fn find(&self, name: &str) -> Option<CommandId> {
        self.ids().find(|id| self.name(*id) == name)
    }

    /// Names from the root down to `id`.
    pub fn path(&self, id: CommandId) -> Vec<&str> {
        let mut path = vec![self.name(id)];
        let mut current = self.parent(id);
        while let Some(parent) = current {
            path.push(self.name(parent));
            current = self.parent(parent);
        }
        path.reverse();
        path
    }

    pub fn flags(&self, id: CommandId) -> &FlagSet {
        self.node(id).flags()
    }

    /// Direct access to a command's flag set. Flags added here use their
    /// own default on this command.
    pub fn flags_mut(&mut self, id: CommandId) -> &mut FlagSet {
        &mut self.nodes[id.0].flags
    }

    /// Attaches `flag` to the command with its effective default.
    pub fn attach_flag(&mut self, id: CommandId, flag: Arc<Flag>, default: FlagValue) -> Result<()> {
        let node = &mut self.nodes[id.0];
        let name = flag.name().to_string();
        node.flags.add_flag(flag)?;
        node.flag_defaults.insert(name, default);
        Ok(())
    }

    pub fn pre_run(&self, id: CommandId) -> Option<&PreRunHook> {
        self.node(id).pre_run()
    }

    /// Installs a pre-run hook, returning the one it replaces.
    ///
    /// Replacing a hook installed by the binder drops its value binding;
    /// chain to the returned hook to keep it.
    pub fn set_pre_run(&mut self, id: CommandId, hook: PreRunHook) -> Option<PreRunHook> {
        self.nodes[id.0].pre_run.replace(hook)
    }

    pub fn take_pre_run(&mut self, id: CommandId) -> Option<PreRunHook> {
        self.nodes[id.0].pre_run.take()
    }

    /// The hook of `id` or of its closest ancestor that has one.
    pub fn nearest_pre_run(&self, id: CommandId) -> Option<(CommandId, &PreRunHook)> {
        let mut current = Some(id);
        while let Some(candidate) = current {
            if let Some(hook) = self.pre_run(candidate) {
                return Some((candidate, hook));
            }
            current = self.parent(candidate);
        }
        None
    }

    pub fn is_bound(&self, id: CommandId) -> bool {
        self.node(id).bound
    }

    pub(crate) fn mark_bound(&mut self, id: CommandId) {
        self.nodes[id.0].bound = true;
    }

    /// Renders the tree as a clap command, flags in attachment order.
    pub fn to_clap(&self) -> clap::Command {
        let mut cmd = self.build_clap(self.root());
        if let Some(version) = &self.version {
            cmd = cmd.version(version.clone());
        }
        cmd
    }

    fn build_clap(&self, id: CommandId) -> clap::Command {
        let node = self.node(id);
        let mut cmd = clap::Command::new(node.name.clone());
        if let Some(about) = &node.about {
            cmd = cmd.about(about.clone());
        }
        for flag in node.flags.iter() {
            cmd = cmd.arg(flag.to_arg(node.flag_default(flag)));
        }
        if node.children.is_empty() {
            cmd = cmd.arg(
                Arg::new(POSITIONAL_ARGS)
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .value_name("ARGS")
                    .value_parser(clap::value_parser!(String))
                    .hide(true),
            );
        }
        for child in &node.children {
            cmd = cmd.subcommand(self.build_clap(*child));
        }
        cmd
    }

    /// Parses `argv`, runs the pre-run chain of the invoked command and
    /// returns the invocation for the caller to execute.
    ///
    /// # Errors
    ///
    /// [`RunError::Parse`] when clap rejects the command line (including
    /// help and version requests), [`RunError::Hook`] when a pre-run hook
    /// fails; the command body must not run in either case.
    pub fn execute<I, T>(&self, argv: I, sink: &mut dyn ConfigSink) -> std::result::Result<Invocation, RunError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.to_clap().try_get_matches_from(argv)?;
        let invocation = self.descend(matches);
        debug!(
            command = %invocation.path.join(" "),
            args = invocation.args.len(),
            "Parsed invocation"
        );

        self.run_pre_run(&invocation, sink)?;
        Ok(invocation)
    }

    /// Runs the nearest pre-run hook for an already parsed invocation.
    pub fn run_pre_run(
        &self,
        invocation: &Invocation,
        sink: &mut dyn ConfigSink,
    ) -> std::result::Result<(), HookError> {
        let Some((owner, hook)) = self.nearest_pre_run(invocation.command) else {
            return Ok(());
        };
        debug!(owner = self.name(owner), "Running pre-run hook");
        let mut ctx = HookContext {
            tree: self,
            command: invocation.command,
            matches: &invocation.matches,
            args: &invocation.args,
            sink,
            invocation,
        };
        hook.call(&mut ctx)
    }

    fn descend(&self, mut matches: ArgMatches) -> Invocation {
        let mut id = self.root();
        let mut ancestors = Vec::new();
        while let Some((name, sub_matches)) = matches.remove_subcommand() {
            let Some(child) = self
                .node(id)
                .children
                .iter()
                .copied()
                .find(|child| self.name(*child) == name)
            else {
                break;
            };
            ancestors.push((id, std::mem::replace(&mut matches, sub_matches)));
            id = child;
        }

        let args = matches
            .try_get_many::<String>(POSITIONAL_ARGS)
            .ok()
            .flatten()
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        Invocation {
            command: id,
            path: self.path(id).into_iter().map(String::from).collect(),
            matches,
            args,
            ancestors,
        }
    }
}
