//! Built-in views applied over a real directory tree

use super::test_utils::{child_names, parent};
use addfs::node::local::LocalDir;
use addfs::views::{NodeStat, ViewKind, ViewsConfig, CONTENT_HASH_NAME, LISTING_NAME, STAT_NAME};
use addfs::{apply_per_node_funcs, Context, Node, Parent, ADDS_DIR_NAME};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn build_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("readme.md"), "# addfs\n").unwrap();
    fs::create_dir_all(root.join("src").join("nested")).unwrap();
    fs::write(root.join("src").join("main.rs"), "fn main() {}\n").unwrap();
    fs::write(root.join("src").join("lib.rs"), "").unwrap();
    temp_dir
}

fn overlay(temp_dir: &TempDir, config: &ViewsConfig) -> Node {
    let local: Arc<dyn Parent> = Arc::new(LocalDir::open(temp_dir.path()).unwrap());
    Node::from(apply_per_node_funcs(local, config.build_funcs()))
}

#[test]
fn test_local_tree_gains_reserved_entries() {
    let ctx = Context::background();
    let temp_dir = build_workspace();
    let root = overlay(&temp_dir, &ViewsConfig::default());

    assert_eq!(
        child_names(&ctx, &parent(root.clone())),
        vec![ADDS_DIR_NAME, "readme.md", "src"]
    );
    assert_eq!(
        child_names(&ctx, &parent(root.lookup(&ctx, "src").unwrap())),
        vec![ADDS_DIR_NAME, "lib.rs", "main.rs", "nested"]
    );

    // Leaves read straight through to disk
    let readme = root.lookup(&ctx, "readme.md").unwrap();
    assert_eq!(readme.read_to_end(&ctx).unwrap(), b"# addfs\n");
}

#[test]
fn test_default_views_for_a_file() {
    let ctx = Context::background();
    let temp_dir = build_workspace();
    let root = overlay(&temp_dir, &ViewsConfig::default());

    let adds = parent(root.lookup(&ctx, ".../readme.md").unwrap());
    assert_eq!(child_names(&ctx, &adds), vec![CONTENT_HASH_NAME, STAT_NAME]);

    let hash = root
        .lookup(&ctx, &format!(".../readme.md/{}", CONTENT_HASH_NAME))
        .unwrap();
    let expected = format!("{}\n", blake3::hash(b"# addfs\n").to_hex());
    assert_eq!(hash.read_to_end(&ctx).unwrap(), expected.as_bytes());

    let stat = root
        .lookup(&ctx, &format!(".../readme.md/{}", STAT_NAME))
        .unwrap();
    let stat: NodeStat = serde_json::from_slice(&stat.read_to_end(&ctx).unwrap()).unwrap();
    assert_eq!(stat.name, "readme.md");
    assert_eq!(stat.kind, "file");
    assert_eq!(stat.size, 8);
}

#[test]
fn test_listing_sees_the_original_directory() {
    let ctx = Context::background();
    let temp_dir = build_workspace();
    let root = overlay(&temp_dir, &ViewsConfig::default());

    let listing = root
        .lookup(&ctx, &format!(".../src/{}", LISTING_NAME))
        .unwrap();
    assert_eq!(
        listing.read_to_end(&ctx).unwrap(),
        b"lib.rs\nmain.rs\nnested/\n"
    );

    // Empty directories get an empty listing
    let listing = root
        .lookup(&ctx, &format!("src/.../nested/{}", LISTING_NAME))
        .unwrap();
    assert_eq!(listing.read_to_end(&ctx).unwrap(), b"");
}

#[test]
fn test_configured_views_only() {
    let ctx = Context::background();
    let temp_dir = build_workspace();
    let config = ViewsConfig {
        enabled: vec![ViewKind::Stat],
        ..ViewsConfig::default()
    };
    let root = overlay(&temp_dir, &config);

    let adds = parent(root.lookup(&ctx, ".../src").unwrap());
    assert_eq!(child_names(&ctx, &adds), vec![STAT_NAME]);
}

#[test]
fn test_hash_limit_skips_large_files() {
    let ctx = Context::background();
    let temp_dir = build_workspace();
    let config = ViewsConfig {
        enabled: vec![ViewKind::ContentHash],
        max_hash_bytes: 4,
        ..ViewsConfig::default()
    };
    let root = overlay(&temp_dir, &config);

    let big = parent(root.lookup(&ctx, ".../readme.md").unwrap());
    assert!(child_names(&ctx, &big).is_empty());

    let empty = parent(root.lookup(&ctx, "src/.../lib.rs").unwrap());
    assert_eq!(child_names(&ctx, &empty), vec![CONTENT_HASH_NAME]);
}

#[test]
fn test_files_removed_after_listing_fail_only_their_entry() {
    let ctx = Context::background();
    let temp_dir = build_workspace();
    let root = overlay(&temp_dir, &ViewsConfig::default());

    let adds = parent(root.lookup(&ctx, "src/...").unwrap());
    let entries = adds.children(&ctx).collect_nodes().unwrap();
    fs::remove_file(temp_dir.path().join("src").join("main.rs")).unwrap();

    let main_adds = entries.iter().find(|e| e.name() == "main.rs").unwrap();
    let err = parent(main_adds.clone())
        .children(&ctx)
        .collect_nodes()
        .unwrap_err();
    assert!(err.to_string().contains("content-hash"));

    let lib_adds = entries.iter().find(|e| e.name() == "lib.rs").unwrap();
    assert_eq!(
        child_names(&ctx, &parent(lib_adds.clone())),
        vec![CONTENT_HASH_NAME, STAT_NAME]
    );
}

#[cfg(unix)]
#[test]
fn test_listing_includes_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let ctx = Context::background();
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join(OsStr::from_bytes(b"bad\xffname")), "").unwrap();
    fs::write(data.join("good.txt"), "").unwrap();

    let config = ViewsConfig {
        enabled: vec![ViewKind::Listing],
        ..ViewsConfig::default()
    };
    let root = overlay(&temp_dir, &config);
    let listing = root
        .lookup(&ctx, &format!(".../data/{}", LISTING_NAME))
        .unwrap();

    assert_eq!(
        String::from_utf8(listing.read_to_end(&ctx).unwrap()).unwrap(),
        "bad\u{FFFD}name\ngood.txt\n"
    );
}
