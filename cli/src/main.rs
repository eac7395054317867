mod list;
mod output;

use std::process;

use redhawk_flags::{
    CommandFlagBinder, CommandTree, ConfigStore, FlagRegistry, Invocation, PreRunHook, RunError,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::list::{ListRequest, output_format};
use crate::output::{OutputFormat, format_request};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the tracing filter (e.g. `debug`).
const LOG_ENV: &str = "REDHAWK_LOG";

fn build_tree() -> CommandTree {
    let mut tree = CommandTree::new("redhawk")
        .with_version(PACKAGE_VERSION)
        .with_about("Scan and list cloud provider resources");
    tree.add_command(tree.root(), "list", Some("List resources of the provider"));
    tree.add_command(tree.root(), "version", Some("Print the version of redhawk"));
    tree.set_pre_run(
        tree.root(),
        PreRunHook::infallible(|ctx| {
            debug!(
                command = ctx.tree.name(ctx.command),
                args = ?ctx.args,
                "Invoking command"
            );
        }),
    );
    tree
}

/// Installs the stderr subscriber. Runs before binding so registry
/// materialization is logged too.
fn init_logging() -> Result<(), String> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(raw) => {
            EnvFilter::try_new(&raw).map_err(|err| format!("invalid {LOG_ENV} '{raw}': {err}"))?
        }
        Err(_) => EnvFilter::new("warn"),
    };
    // Fails only when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

fn main() {
    if let Err(err) = init_logging() {
        eprintln!("error: {err}");
        process::exit(1);
    }

    let registry = FlagRegistry::redhawk();
    let mut tree = build_tree();
    if let Err(err) = CommandFlagBinder::new(&registry).bind_all(&mut tree) {
        eprintln!("error: {err}");
        process::exit(1);
    }

    let mut store = ConfigStore::new();
    let invocation = match tree.execute(std::env::args_os(), &mut store) {
        Ok(invocation) => invocation,
        Err(RunError::Parse(err)) => err.exit(),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = run(&tree, &invocation, &store) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(tree: &CommandTree, invocation: &Invocation, store: &ConfigStore) -> Result<(), String> {
    debug!(command = %invocation.path.join(" "), "Running command");
    match tree.name(invocation.command) {
        "list" => run_list(store),
        "version" => run_version(),
        _ => tree
            .to_clap()
            .print_help()
            .map_err(|err| format!("Failed to print help: {err}")),
    }
}

fn run_list(store: &ConfigStore) -> Result<(), String> {
    let format: OutputFormat = output_format(store).parse()?;
    let request = ListRequest::from_store(store)?;
    let raw = format_request(&request, format)?;
    print!("{raw}");
    if !raw.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn run_version() -> Result<(), String> {
    println!("redhawk {PACKAGE_VERSION}");
    Ok(())
}
