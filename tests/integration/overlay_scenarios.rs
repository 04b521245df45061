//! End-to-end overlay behavior over in-memory trees

use super::test_utils::{child_names, parent};
use addfs::node::memory::{dir, file};
use addfs::overlay::{Diagnostic, RecordingSink};
use addfs::{
    additions_dir, apply_per_node_funcs, per_node_func, Context, FileInfo, Node, NodeError,
    PerNodeFuncs, ADDS_DIR_NAME,
};
use std::sync::Arc;

/// parent/dir1/{fileA, fileB, dir2/}
fn sample_tree() -> (Node, Node) {
    let file_a = file("fileA", "alpha");
    let tree = dir(
        "parent",
        vec![dir(
            "dir1",
            vec![file_a.clone(), file("fileB", "beta"), dir("dir2", vec![])],
        )],
    );
    (tree, file_a)
}

/// Adds `viewX` for `fileA` only
fn view_x_funcs() -> PerNodeFuncs {
    PerNodeFuncs::new(vec![per_node_func("view-x", |_, node| {
        if node.name() == "fileA" {
            Ok(vec![file("viewX", "derived from fileA")])
        } else {
            Ok(vec![])
        }
    })])
}

#[test]
fn test_end_to_end_scenario() {
    let ctx = Context::background();
    let (tree, file_a) = sample_tree();
    let wrapped = Node::from(apply_per_node_funcs(parent(tree), view_x_funcs()));

    let adds_for_a = parent(wrapped.lookup(&ctx, "dir1/.../fileA").unwrap());
    let adds = adds_for_a.children(&ctx).collect_nodes().unwrap();
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].name(), "viewX");
    assert_eq!(adds[0].read_to_end(&ctx).unwrap(), b"derived from fileA");

    let adds_for_b = parent(wrapped.lookup(&ctx, "dir1/.../fileB").unwrap());
    assert!(child_names(&ctx, &adds_for_b).is_empty());

    let unchanged = wrapped.lookup(&ctx, "dir1/fileA").unwrap();
    assert!(unchanged.ptr_eq(&file_a));
}

#[test]
fn test_listing_of_wrapped_directory() {
    let ctx = Context::background();
    let (tree, _) = sample_tree();
    let wrapped = apply_per_node_funcs(parent(tree), view_x_funcs());

    let dir1 = parent(wrapped.child(&ctx, "dir1").unwrap());
    assert_eq!(
        child_names(&ctx, &dir1),
        vec![ADDS_DIR_NAME, "fileA", "fileB", "dir2"]
    );

    let adds = parent(dir1.child(&ctx, ADDS_DIR_NAME).unwrap());
    assert_eq!(child_names(&ctx, &adds), vec!["fileA", "fileB", "dir2"]);

    // Empty original directories still get a reserved entry
    let dir2 = parent(dir1.child(&ctx, "dir2").unwrap());
    assert_eq!(child_names(&ctx, &dir2), vec![ADDS_DIR_NAME]);
}

#[test]
fn test_reserved_child_matches_standalone_additions_dir() {
    let ctx = Context::background();
    let (tree, _) = sample_tree();
    let original = parent(tree.lookup(&ctx, "dir1").unwrap());
    let funcs = view_x_funcs();

    let via_wrapper = parent(
        apply_per_node_funcs(Arc::clone(&original), funcs.clone())
            .child(&ctx, ADDS_DIR_NAME)
            .unwrap(),
    );
    let standalone = additions_dir(original, funcs);

    assert_eq!(via_wrapper.info(), standalone.info());
    assert_eq!(child_names(&ctx, &via_wrapper), child_names(&ctx, &standalone));

    let a1 = Node::from(via_wrapper).lookup(&ctx, "fileA/viewX").unwrap();
    let a2 = Node::from(standalone).lookup(&ctx, "fileA/viewX").unwrap();
    assert_eq!(a1.read_to_end(&ctx).unwrap(), a2.read_to_end(&ctx).unwrap());
}

#[test]
fn test_wrapped_subdirectory_matches_wrapping_it_directly() {
    let ctx = Context::background();
    let (tree, _) = sample_tree();
    let funcs = view_x_funcs();

    let via_parent = parent(
        apply_per_node_funcs(parent(tree.clone()), funcs.clone())
            .child(&ctx, "dir1")
            .unwrap(),
    );
    let direct = apply_per_node_funcs(parent(tree.lookup(&ctx, "dir1").unwrap()), funcs);

    assert_eq!(via_parent.info(), direct.info());
    assert_eq!(child_names(&ctx, &via_parent), child_names(&ctx, &direct));
}

/// Adds `names`, a comma-separated listing, for every directory
fn listing_funcs() -> PerNodeFuncs {
    PerNodeFuncs::new(vec![per_node_func("names", |ctx, node| match node {
        Node::Parent(dir) => {
            let names: Vec<String> = dir
                .children(ctx)
                .collect_nodes()?
                .iter()
                .map(|n| n.name())
                .collect();
            Ok(vec![file("names", names.join(","))])
        }
        Node::Leaf(_) => Ok(vec![]),
    })])
}

#[test]
fn test_double_wrapping_keeps_both_reserved_directories() {
    let ctx = Context::background();
    let (tree, _) = sample_tree();
    let once = apply_per_node_funcs(parent(tree), view_x_funcs());
    let twice = Node::from(apply_per_node_funcs(once, listing_funcs()));

    // Both reserved directories are listed, outer first
    assert_eq!(
        child_names(&ctx, &parent(twice.clone())),
        vec![ADDS_DIR_NAME, ADDS_DIR_NAME, "dir1"]
    );

    // Lookup by name resolves to the outer one
    let dir1 = parent(twice.lookup(&ctx, "dir1").unwrap());
    let listed = dir1.children(&ctx).collect_nodes().unwrap();
    assert!(dir1.child(&ctx, ADDS_DIR_NAME).unwrap().ptr_eq(&listed[0]));
    assert!(!listed[0].ptr_eq(&listed[1]));

    // The inner one, reached from the listing, still serves the inner additions
    let view_x = listed[1].lookup(&ctx, "fileA/viewX").unwrap();
    assert_eq!(view_x.read_to_end(&ctx).unwrap(), b"derived from fileA");
    assert!(listed[0].lookup(&ctx, "fileA/viewX").unwrap_err().is_not_found());

    // The outer additions see the once-wrapped tree, inner reserved entry included
    let outer_adds = parent(twice.lookup(&ctx, ADDS_DIR_NAME).unwrap());
    assert_eq!(child_names(&ctx, &outer_adds), vec![ADDS_DIR_NAME, "dir1"]);

    let inner_listing = twice.lookup(&ctx, ".../.../names").unwrap();
    assert_eq!(inner_listing.read_to_end(&ctx).unwrap(), b"dir1");

    let dir1_listing = twice.lookup(&ctx, ".../dir1/names").unwrap();
    assert_eq!(
        dir1_listing.read_to_end(&ctx).unwrap(),
        b"...,fileA,fileB,dir2"
    );
}

#[test]
fn test_conflicting_names_keep_last_and_report() {
    let ctx = Context::background();
    let sink = Arc::new(RecordingSink::new());
    let funcs = PerNodeFuncs::new(vec![
        per_node_func("f1", |_, _| Ok(vec![file("x", "one")])),
        per_node_func("f2", |_, _| Ok(vec![file("x", "two")])),
    ])
    .with_sink(sink.clone());

    let (tree, _) = sample_tree();
    let wrapped = Node::from(apply_per_node_funcs(parent(tree), funcs));
    let entry_adds = parent(wrapped.lookup(&ctx, "dir1/.../fileB").unwrap());

    let adds = entry_adds.children(&ctx).collect_nodes().unwrap();
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].read_to_end(&ctx).unwrap(), b"two");
    assert_eq!(
        sink.diagnostics(),
        vec![Diagnostic::NameConflict {
            entry: "fileB".to_string(),
            name: "x".to_string(),
            func: "f2".to_string(),
        }]
    );
}

#[test]
fn test_failure_is_isolated_to_one_entry() {
    let ctx = Context::background();
    let funcs = PerNodeFuncs::new(vec![per_node_func("picky", |_, node| {
        if node.name() == "fileA" {
            Err(NodeError::Failed("cannot handle fileA".to_string()))
        } else {
            Ok(vec![file("ok", "")])
        }
    })]);

    let (tree, _) = sample_tree();
    let wrapped = Node::from(apply_per_node_funcs(parent(tree), funcs));
    let adds = parent(wrapped.lookup(&ctx, "dir1/...").unwrap());

    // Entry directories are listed without running any function
    assert_eq!(child_names(&ctx, &adds), vec!["fileA", "fileB", "dir2"]);

    let failing = parent(adds.child(&ctx, "fileA").unwrap());
    let err = failing.children(&ctx).collect_nodes().unwrap_err();
    assert!(matches!(err, NodeError::Computation { ref func, ref entry, .. }
        if func == "picky" && entry == "fileA"));
    assert!(err.to_string().contains("cannot handle fileA"));
    assert!(failing.child(&ctx, "ok").is_err());

    let healthy = parent(adds.child(&ctx, "fileB").unwrap());
    assert_eq!(child_names(&ctx, &healthy), vec!["ok"]);

    // The rest of the tree stays browsable
    assert_eq!(
        wrapped.lookup(&ctx, "dir1/fileA").unwrap().read_to_end(&ctx).unwrap(),
        b"alpha"
    );
}

#[test]
fn test_unreadable_entry_gets_traversable_additions_dir() {
    let ctx = Context::background();
    let locked = Node::leaf(addfs::node::memory::ConstLeaf::with_info(
        FileInfo::file("locked").with_mode_perm(0),
        "secret",
    ));
    let root = dir("root", vec![locked]);
    let wrapped = Node::from(apply_per_node_funcs(parent(root), view_x_funcs()));

    let entry_adds = wrapped.lookup(&ctx, ".../locked").unwrap();
    let info = entry_adds.info();
    assert!(info.is_dir());
    assert_eq!(info.mode_perm() & 0o111, 0o111);
}

#[test]
fn test_missing_entries_are_not_found_everywhere() {
    let ctx = Context::background();
    let (tree, _) = sample_tree();
    let wrapped = Node::from(apply_per_node_funcs(parent(tree), view_x_funcs()));

    assert!(wrapped.lookup(&ctx, "nope").unwrap_err().is_not_found());
    assert!(wrapped.lookup(&ctx, ".../nope").unwrap_err().is_not_found());
    assert!(wrapped
        .lookup(&ctx, "dir1/.../fileB/viewX")
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_directory_additions_get_their_own_reserved_entry() {
    let ctx = Context::background();
    let funcs = PerNodeFuncs::new(vec![per_node_func("summary", |_, node| {
        if node.is_parent() {
            Ok(vec![])
        } else {
            Ok(vec![dir("summary", vec![file("size", node.info().size().to_string())])])
        }
    })]);

    let (tree, _) = sample_tree();
    let wrapped = Node::from(apply_per_node_funcs(parent(tree), funcs));

    let size = wrapped
        .lookup(&ctx, "dir1/.../fileA/summary/size")
        .unwrap();
    assert_eq!(size.read_to_end(&ctx).unwrap(), b"5");

    // Additions to additions
    let nested = parent(
        wrapped
            .lookup(&ctx, "dir1/.../fileA/summary/.../size")
            .unwrap(),
    );
    let nested_adds = nested.children(&ctx).collect_nodes().unwrap();
    assert_eq!(nested_adds.len(), 1);
    assert_eq!(nested_adds[0].name(), "summary");
}
