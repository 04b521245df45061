//! Overlay wrapper and recursion driver

use super::adds::AdditionsDir;
use super::func::PerNodeFuncs;
use super::ADDS_DIR_NAME;
use crate::context::Context;
use crate::error::NodeError;
use crate::node::{FileInfo, Node, NodeIter, Parent};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// An original directory extended with the `...` child
pub struct OverlayParent {
    original: Arc<dyn Parent>,
    funcs: PerNodeFuncs,
    adds: Arc<AdditionsDir>,
}

/// Wrap `original` so it and every directory below it expose `...`.
///
/// Construction does no I/O; all work happens in `child` / `children`.
pub fn apply_per_node_funcs(original: Arc<dyn Parent>, funcs: PerNodeFuncs) -> Arc<dyn Parent> {
    Arc::new(OverlayParent::new(original, funcs))
}

/// Re-wrap parents, pass leaves through untouched.
pub fn recurse(node: Node, funcs: &PerNodeFuncs) -> Node {
    match node {
        Node::Parent(parent) => Node::Parent(apply_per_node_funcs(parent, funcs.clone())),
        leaf @ Node::Leaf(_) => leaf,
    }
}

impl OverlayParent {
    pub fn new(original: Arc<dyn Parent>, funcs: PerNodeFuncs) -> Self {
        let adds = Arc::new(AdditionsDir::new(Arc::clone(&original), funcs.clone()));
        Self {
            original,
            funcs,
            adds,
        }
    }

    pub fn original(&self) -> &Arc<dyn Parent> {
        &self.original
    }

    pub fn funcs(&self) -> &PerNodeFuncs {
        &self.funcs
    }

    /// The `...` directory for this level.
    pub fn additions(&self) -> Node {
        Node::Parent(self.adds.clone())
    }
}

impl Parent for OverlayParent {
    fn info(&self) -> FileInfo {
        self.original.info()
    }

    fn child(&self, ctx: &Context, name: &str) -> Result<Node, NodeError> {
        if name == ADDS_DIR_NAME {
            return Ok(self.additions());
        }
        let child = self.original.child(ctx, name)?;
        trace!(name = %name, is_parent = child.is_parent(), "Overlay child lookup");
        Ok(recurse(child, &self.funcs))
    }

    fn children(&self, ctx: &Context) -> NodeIter {
        let funcs = self.funcs.clone();
        NodeIter::once(self.additions()).chain(
            self.original
                .children(ctx)
                .map_nodes(move |child| Ok(recurse(child, &funcs))),
        )
    }

    fn cacheable_for(&self) -> Option<Duration> {
        self.original.cacheable_for()
    }
}
