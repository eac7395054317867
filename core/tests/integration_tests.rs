use std::sync::{Arc, Mutex};

use redhawk_flags::{
    CommandFlagBinder, CommandTree, ConfigStore, ConfigurationError, FlagDescriptor, FlagRegistry,
    FlagValue, HookError, PreRunHook, RunError,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn redhawk_tree() -> CommandTree {
    let mut tree = CommandTree::new("redhawk");
    tree.add_command(tree.root(), "list", Some("List resources"));
    tree.add_command(tree.root(), "scan", Some("Scan resources"));
    tree
}

fn output_descriptor() -> FlagDescriptor {
    FlagDescriptor::string("output", "table")
        .with_shorthand('o')
        .with_usage("output format")
        .defined_on(["list"])
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn unset_output_flag_binds_default() {
    let registry = FlagRegistry::new().with(output_descriptor());
    let mut tree = redhawk_tree();
    let list = tree.find("list").unwrap();
    CommandFlagBinder::new(&registry).bind(&mut tree, list).unwrap();

    let mut store = ConfigStore::new();
    tree.execute(["redhawk", "list"], &mut store).unwrap();

    assert_eq!(store.get_str("output"), Some("table"));
    assert!(!store.is_set_by_flag("output"));
}

#[test]
fn shorthand_sets_boolean_flag() {
    let registry = FlagRegistry::new().with(
        FlagDescriptor::boolean("all", false)
            .with_shorthand('A')
            .defined_on(["list"]),
    );
    let mut tree = redhawk_tree();
    let list = tree.find("list").unwrap();
    CommandFlagBinder::new(&registry).bind(&mut tree, list).unwrap();

    let mut store = ConfigStore::new();
    tree.execute(["redhawk", "list", "-A"], &mut store).unwrap();

    assert_eq!(store.get_bool("all"), Some(true));
    assert!(store.is_set_by_flag("all"));
}

#[test]
fn other_command_gets_no_flags() {
    let registry = FlagRegistry::new().with(output_descriptor());
    let mut tree = redhawk_tree();
    let scan = tree.find("scan").unwrap();
    let attached = CommandFlagBinder::new(&registry).bind(&mut tree, scan).unwrap();

    assert_eq!(attached, 0);
    assert!(tree.flags(scan).is_empty());

    let mut store = ConfigStore::new();
    let err = tree
        .execute(["redhawk", "scan", "--output", "json"], &mut store)
        .unwrap_err();
    assert!(matches!(err, RunError::Parse(_)));
}

// ---------------------------------------------------------------------------
// Registry properties
// ---------------------------------------------------------------------------

#[test]
fn materialization_is_shared_across_bindings() {
    let registry = FlagRegistry::new().with(output_descriptor());
    let descriptor = registry.get("output").unwrap();

    let first = descriptor.materialize().unwrap();
    let mut tree = redhawk_tree();
    let list = tree.find("list").unwrap();
    CommandFlagBinder::new(&registry).bind(&mut tree, list).unwrap();

    let attached = tree.flags(list).lookup("output").unwrap();
    assert!(Arc::ptr_eq(&first, attached));
    assert_eq!(tree.flags(list).len(), 1);
}

#[test]
fn redhawk_registry_attaches_in_order() {
    let registry = FlagRegistry::redhawk();
    let mut tree = redhawk_tree();
    CommandFlagBinder::new(&registry).bind_all(&mut tree).unwrap();

    let list = tree.find("list").unwrap();
    assert_eq!(
        tree.flags(list).names(),
        vec!["region", "config", "detail", "all", "resources", "output"]
    );
    assert!(tree.flags(tree.find("scan").unwrap()).is_empty());
    assert!(tree.flags(tree.root()).is_empty());
}

#[test]
fn redhawk_registry_resolves_every_flag() {
    let registry = FlagRegistry::redhawk();
    let mut tree = redhawk_tree();
    CommandFlagBinder::new(&registry).bind_all(&mut tree).unwrap();

    let mut store = ConfigStore::new();
    tree.execute(
        [
            "redhawk",
            "list",
            "-r",
            "ap-northeast-2",
            "--resources",
            "ec2,rds",
            "--detail",
            "-o",
            "yaml",
        ],
        &mut store,
    )
    .unwrap();

    assert_eq!(store.get_str("region"), Some("ap-northeast-2"));
    assert_eq!(store.get_str("config"), Some(""));
    assert_eq!(store.get_bool("detail"), Some(true));
    assert_eq!(store.get_bool("all"), Some(false));
    assert_eq!(store.get_str("resources"), Some("ec2,rds"));
    assert_eq!(store.get_str("output"), Some("yaml"));
}

#[test]
fn unknown_operation_fails_startup() {
    let registry = FlagRegistry::new().with(
        FlagDescriptor::string("output", "table")
            .with_operation("doesNotExist")
            .defined_on(["list"]),
    );
    let mut tree = redhawk_tree();

    let err = CommandFlagBinder::new(&registry)
        .bind_all(&mut tree)
        .unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::UnknownOperation {
            flag: "output".to_string(),
            operation: "doesNotExist".to_string(),
        }
    );
}

#[test]
fn descriptor_for_missing_command_fails_startup() {
    let registry =
        FlagRegistry::new().with(FlagDescriptor::boolean("force", false).defined_on(["delete"]));
    let mut tree = redhawk_tree();

    assert!(matches!(
        CommandFlagBinder::new(&registry).bind_all(&mut tree),
        Err(ConfigurationError::UnknownCommand { .. })
    ));
}

// ---------------------------------------------------------------------------
// Hook chaining
// ---------------------------------------------------------------------------

#[test]
fn failing_parent_hook_is_returned_unchanged() {
    let registry = FlagRegistry::new().with(output_descriptor());
    let mut tree = redhawk_tree();
    let parent_error = HookError::failed("redhawk", "profile not found");
    let returned = parent_error.clone();
    tree.set_pre_run(
        tree.root(),
        PreRunHook::fallible(move |_| Err(returned.clone())),
    );
    let list = tree.find("list").unwrap();
    CommandFlagBinder::new(&registry).bind(&mut tree, list).unwrap();

    let mut store = ConfigStore::new();
    let err = tree
        .execute(["redhawk", "list", "-o", "json"], &mut store)
        .unwrap_err();

    match err {
        RunError::Hook(err) => assert_eq!(err, parent_error),
        other => panic!("expected hook error, got {other:?}"),
    }
    // The child's push runs before the parent hook fails.
    assert_eq!(store.get_str("output"), Some("json"));
}

#[test]
fn hook_order_is_child_push_then_parent() {
    let registry = FlagRegistry::new().with(output_descriptor());
    let mut tree = redhawk_tree();
    let seen = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen);
    tree.set_pre_run(
        tree.root(),
        PreRunHook::fallible(move |ctx| {
            // The parent sees the invoked command, not itself.
            let name = ctx.tree.name(ctx.command).to_string();
            *record.lock().unwrap() = Some(name);
            Ok(())
        }),
    );
    let list = tree.find("list").unwrap();
    CommandFlagBinder::new(&registry).bind(&mut tree, list).unwrap();

    let mut store = ConfigStore::new();
    tree.execute(["redhawk", "list"], &mut store).unwrap();
    assert_eq!(seen.lock().unwrap().as_deref(), Some("list"));
}

#[test]
fn nested_bindings_push_every_level() {
    let registry = FlagRegistry::new()
        .with(FlagDescriptor::string("profile", "default").defined_on(["aws"]))
        .with(FlagDescriptor::boolean("detail", false).defined_on(["ec2"]));
    let mut tree = CommandTree::new("redhawk");
    let aws = tree.add_command(tree.root(), "aws", None);
    let ec2 = tree.add_command(aws, "ec2", None);
    let binder = CommandFlagBinder::new(&registry);
    binder.bind(&mut tree, ec2).unwrap();
    binder.bind(&mut tree, aws).unwrap();

    let mut store = ConfigStore::new();
    tree.execute(["redhawk", "aws", "ec2", "--detail"], &mut store)
        .unwrap();

    assert_eq!(store.get_bool("detail"), Some(true));
    assert_eq!(store.get("profile"), Some(&FlagValue::from("default")));
    assert!(!store.is_set_by_flag("profile"));
}

#[test]
fn ancestor_flag_given_before_subcommand_is_pushed() {
    let registry = FlagRegistry::new()
        .with(FlagDescriptor::string("profile", "default").defined_on(["aws"]))
        .with(FlagDescriptor::boolean("detail", false).defined_on(["ec2"]));
    let mut tree = CommandTree::new("redhawk");
    let aws = tree.add_command(tree.root(), "aws", None);
    tree.add_command(aws, "ec2", None);
    CommandFlagBinder::new(&registry).bind_all(&mut tree).unwrap();

    let mut store = ConfigStore::new();
    tree.execute(["redhawk", "aws", "--profile", "prod", "ec2"], &mut store)
        .unwrap();

    assert_eq!(store.get_str("profile"), Some("prod"));
    assert!(store.is_set_by_flag("profile"));
    assert_eq!(store.get_bool("detail"), Some(false));
}

// ---------------------------------------------------------------------------
// Flags shared by a command and its ancestor
// ---------------------------------------------------------------------------

fn shared_output_tree() -> CommandTree {
    let registry = FlagRegistry::new().with(
        FlagDescriptor::string("output", "table")
            .with_default_for("ec2", "json")
            .defined_on(["aws", "ec2"]),
    );
    let mut tree = CommandTree::new("redhawk");
    let aws = tree.add_command(tree.root(), "aws", None);
    tree.add_command(aws, "ec2", None);
    CommandFlagBinder::new(&registry).bind_all(&mut tree).unwrap();
    tree
}

#[test]
fn descendant_default_survives_ancestor_hook() {
    let tree = shared_output_tree();
    let mut store = ConfigStore::new();
    tree.execute(["redhawk", "aws", "ec2"], &mut store).unwrap();
    assert_eq!(store.get_str("output"), Some("json"));
}

#[test]
fn explicit_ancestor_value_beats_descendant_default() {
    let tree = shared_output_tree();
    let mut store = ConfigStore::new();
    tree.execute(["redhawk", "aws", "--output", "yaml", "ec2"], &mut store)
        .unwrap();
    assert_eq!(store.get_str("output"), Some("yaml"));
}

#[test]
fn explicit_descendant_value_beats_ancestor_value() {
    let tree = shared_output_tree();
    let mut store = ConfigStore::new();
    tree.execute(
        ["redhawk", "aws", "--output", "yaml", "ec2", "--output", "csv"],
        &mut store,
    )
    .unwrap();
    assert_eq!(store.get_str("output"), Some("csv"));
}

// ---------------------------------------------------------------------------
// Parser-reserved arguments
// ---------------------------------------------------------------------------

#[test]
fn help_shorthand_fails_startup_not_invocation() {
    let registry = FlagRegistry::new().with(
        FlagDescriptor::string("host", "")
            .with_shorthand('h')
            .defined_on(["list"]),
    );
    let mut tree = redhawk_tree();

    assert_eq!(
        CommandFlagBinder::new(&registry).bind_all(&mut tree),
        Err(ConfigurationError::ReservedShorthand {
            flag: "host".to_string(),
            shorthand: 'h',
        })
    );
}

#[test]
fn parent_hook_receives_same_positional_args() {
    let registry = FlagRegistry::new().with(output_descriptor());
    let mut tree = redhawk_tree();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    tree.set_pre_run(
        tree.root(),
        PreRunHook::fallible(move |ctx| {
            record.lock().unwrap().extend(ctx.args.iter().cloned());
            Ok(())
        }),
    );
    CommandFlagBinder::new(&registry).bind_all(&mut tree).unwrap();

    let mut store = ConfigStore::new();
    let invocation = tree
        .execute(["redhawk", "list", "-o", "json", "ec2", "rds"], &mut store)
        .unwrap();

    assert_eq!(invocation.args, vec!["ec2", "rds"]);
    assert_eq!(*seen.lock().unwrap(), vec!["ec2", "rds"]);
    assert_eq!(store.get_str("output"), Some("json"));
}
