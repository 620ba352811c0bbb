//! Sentinel normalization and path containment properties

use proptest::prelude::*;
use treesync::tree::{normalize_target_path, normalize_workspace_scope, WorkspacePath};

fn path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("root".to_string()),
        Just(String::new()),
        Just("/".to_string()),
        "(/?[a-zA-Z0-9_.é-]{1,8}){0,4}/?",
    ]
}

/// Normalizing twice is the same as normalizing once
#[test]
fn test_normalization_is_idempotent() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&path_strategy(), |path| {
            let scope = normalize_workspace_scope(&path);
            prop_assert_eq!(normalize_workspace_scope(scope), scope);

            let target = normalize_target_path(&path);
            prop_assert_eq!(normalize_target_path(target), target);
            prop_assert!(!target.is_empty());
            Ok(())
        })
        .unwrap();
}

/// Only the sentinel and the empty scope are rewritten
#[test]
fn test_non_root_paths_pass_through_verbatim() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&path_strategy(), |path| {
            prop_assume!(path != "root" && !path.is_empty());
            let parsed = WorkspacePath::parse(&path);
            prop_assert_eq!(parsed.sparse_scope(), path.as_str());
            prop_assert_eq!(parsed.relative_dir(), path.as_str());
            prop_assert_eq!(parsed.target_path(), path.as_str());
            Ok(())
        })
        .unwrap();
}

/// A joined child is always contained by its parent, never the reverse
#[test]
fn test_join_produces_contained_child() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(path_strategy(), "[a-z]{1,6}"), |(parent, name)| {
            let parent = WorkspacePath::parse(&parent);
            let child = parent.join(&name);
            prop_assert!(parent.contains(&child));
            prop_assert!(!child.contains(&parent));
            prop_assert_eq!(child.segments().len(), parent.segments().len() + 1);
            Ok(())
        })
        .unwrap();
}
