//! Node Abstraction
//!
//! A tree is made of [`Node`]s, each either a [`Leaf`] (readable content) or a
//! [`Parent`] (named children). Nodes are shared behind `Arc` and never mutated;
//! wrappers compose new nodes around existing ones instead.

mod info;
mod iter;
pub mod local;
pub mod memory;

pub use info::FileInfo;
pub use iter::NodeIter;

use crate::context::Context;
use crate::error::NodeError;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

/// A node without children
pub trait Leaf: Send + Sync {
    fn info(&self) -> FileInfo;

    /// Open the leaf's content for reading.
    fn open(&self, ctx: &Context) -> Result<Box<dyn Read + Send>, NodeError>;

    /// How long downstream layers may cache this node. `None` means no hint.
    fn cacheable_for(&self) -> Option<Duration> {
        self.info().cacheable_for()
    }
}

/// A node with named children
///
/// Implementations must be safe to query from several threads at once.
pub trait Parent: Send + Sync {
    fn info(&self) -> FileInfo;

    /// Look up a direct child, failing with [`NodeError::NotFound`] if absent.
    fn child(&self, ctx: &Context, name: &str) -> Result<Node, NodeError>;

    /// Lazily enumerate direct children.
    ///
    /// Each call returns a fresh sequence. Ordering is implementation-defined.
    fn children(&self, ctx: &Context) -> NodeIter;

    /// How long downstream layers may cache this node. `None` means no hint.
    fn cacheable_for(&self) -> Option<Duration> {
        self.info().cacheable_for()
    }
}

/// Tree element: closed over the two node capabilities
#[derive(Clone)]
pub enum Node {
    Leaf(Arc<dyn Leaf>),
    Parent(Arc<dyn Parent>),
}

impl Node {
    pub fn leaf(leaf: impl Leaf + 'static) -> Self {
        Node::Leaf(Arc::new(leaf))
    }

    pub fn parent(parent: impl Parent + 'static) -> Self {
        Node::Parent(Arc::new(parent))
    }

    pub fn info(&self) -> FileInfo {
        match self {
            Node::Leaf(leaf) => leaf.info(),
            Node::Parent(parent) => parent.info(),
        }
    }

    pub fn name(&self) -> String {
        self.info().name().to_string()
    }

    pub fn cacheable_for(&self) -> Option<Duration> {
        match self {
            Node::Leaf(leaf) => leaf.cacheable_for(),
            Node::Parent(parent) => parent.cacheable_for(),
        }
    }

    pub fn is_parent(&self) -> bool {
        matches!(self, Node::Parent(_))
    }

    pub fn as_parent(&self) -> Option<&Arc<dyn Parent>> {
        match self {
            Node::Parent(parent) => Some(parent),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Arc<dyn Leaf>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Parent(_) => None,
        }
    }

    /// True if both handles point at the same underlying node
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Leaf(a), Node::Leaf(b)) => Arc::ptr_eq(a, b),
            (Node::Parent(a), Node::Parent(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Walk a `/`-separated relative path starting at this node.
    ///
    /// Empty components are skipped, so `"a//b/"` resolves like `"a/b"`.
    pub fn lookup(&self, ctx: &Context, path: &str) -> Result<Node, NodeError> {
        let mut current = self.clone();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let next = match &current {
                Node::Parent(parent) => parent.child(ctx, component)?,
                Node::Leaf(leaf) => {
                    return Err(NodeError::NotADirectory {
                        name: leaf.info().name().to_string(),
                    })
                }
            };
            current = next;
        }
        Ok(current)
    }

    /// Read a leaf's full content.
    pub fn read_to_end(&self, ctx: &Context) -> Result<Vec<u8>, NodeError> {
        match self {
            Node::Leaf(leaf) => {
                let mut content = Vec::new();
                leaf.open(ctx)?.read_to_end(&mut content)?;
                Ok(content)
            }
            Node::Parent(parent) => Err(NodeError::Failed(format!(
                "cannot read directory {}",
                parent.info().name()
            ))),
        }
    }
}

impl From<Arc<dyn Parent>> for Node {
    fn from(parent: Arc<dyn Parent>) -> Self {
        Node::Parent(parent)
    }
}

impl From<Arc<dyn Leaf>> for Node {
    fn from(leaf: Arc<dyn Leaf>) -> Self {
        Node::Leaf(leaf)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(leaf) => f.debug_tuple("Leaf").field(&leaf.info().name()).finish(),
            Node::Parent(parent) => f
                .debug_tuple("Parent")
                .field(&parent.info().name())
                .finish(),
        }
    }
}
