//! Addfs: Computed Additions Over Read-Only Trees
//!
//! Wraps a read-only directory tree so that every directory gains a reserved `...`
//! child. For each original entry `e`, `.../e` is a directory whose contents are
//! produced lazily by an ordered list of per-node functions applied to `e`.
//!
//! ```
//! use addfs::node::memory::{dir, file};
//! use addfs::{apply_per_node_funcs, per_node_func, Context, Node, PerNodeFuncs};
//!
//! let ctx = Context::background();
//! let root = dir("root", vec![file("a.txt", "hello")]);
//! let funcs = PerNodeFuncs::new(vec![per_node_func("upper", |ctx, node| {
//!     let content = node.read_to_end(ctx)?;
//!     Ok(vec![file("upper.txt", content.to_ascii_uppercase())])
//! })]);
//!
//! let wrapped = Node::from(apply_per_node_funcs(root.as_parent().cloned().unwrap(), funcs));
//! let upper = wrapped.lookup(&ctx, ".../a.txt/upper.txt").unwrap();
//! assert_eq!(upper.read_to_end(&ctx).unwrap(), b"HELLO");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod node;
pub mod overlay;
pub mod views;

pub use context::{CancellationSource, Context};
pub use error::{ApiError, NodeError};
pub use node::{FileInfo, Leaf, Node, NodeIter, Parent};
pub use overlay::{
    additions_dir, apply_per_node_funcs, per_node_func, PerNodeFunc, PerNodeFuncs, ADDS_DIR_NAME,
};
