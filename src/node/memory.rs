//! In-memory nodes
//!
//! Building blocks for synthetic trees: fixed-content leaves, fixed directories,
//! and directories whose children are produced by a closure on every listing.

use super::{FileInfo, Leaf, Node, NodeIter, Parent};
use crate::context::Context;
use crate::error::NodeError;
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;

/// Leaf with fixed in-memory content
#[derive(Debug, Clone)]
pub struct ConstLeaf {
    info: FileInfo,
    content: Arc<[u8]>,
}

impl ConstLeaf {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::with_info(FileInfo::file(name), content)
    }

    /// Use `info` as-is except for the size, which always matches `content`.
    pub fn with_info(info: FileInfo, content: impl Into<Vec<u8>>) -> Self {
        let content: Arc<[u8]> = Arc::from(content.into());
        Self {
            info: info.with_size(content.len() as u64),
            content,
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl Leaf for ConstLeaf {
    fn info(&self) -> FileInfo {
        self.info.clone()
    }

    fn open(&self, ctx: &Context) -> Result<Box<dyn Read + Send>, NodeError> {
        ctx.check()?;
        Ok(Box::new(Cursor::new(Arc::clone(&self.content))))
    }
}

/// Directory with a fixed list of children
#[derive(Debug, Clone)]
pub struct StaticParent {
    info: FileInfo,
    children: Vec<Node>,
}

impl StaticParent {
    pub fn new(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self::with_info(FileInfo::dir(name), children)
    }

    pub fn with_info(info: FileInfo, children: Vec<Node>) -> Self {
        Self { info, children }
    }
}

impl Parent for StaticParent {
    fn info(&self) -> FileInfo {
        self.info.clone()
    }

    fn child(&self, ctx: &Context, name: &str) -> Result<Node, NodeError> {
        ctx.check()?;
        self.children
            .iter()
            .find(|child| child.info().name() == name)
            .cloned()
            .ok_or_else(|| NodeError::not_found(name))
    }

    fn children(&self, _ctx: &Context) -> NodeIter {
        NodeIter::from_nodes(self.children.clone())
    }
}

type ChildrenFn = dyn Fn(&Context) -> Result<Vec<Node>, NodeError> + Send + Sync;

/// Directory whose children are recomputed by a closure on every call
#[derive(Clone)]
pub struct FuncParent {
    info: FileInfo,
    produce: Arc<ChildrenFn>,
}

impl FuncParent {
    pub fn new<F>(info: FileInfo, produce: F) -> Self
    where
        F: Fn(&Context) -> Result<Vec<Node>, NodeError> + Send + Sync + 'static,
    {
        Self {
            info,
            produce: Arc::new(produce),
        }
    }
}

impl Parent for FuncParent {
    fn info(&self) -> FileInfo {
        self.info.clone()
    }

    fn child(&self, ctx: &Context, name: &str) -> Result<Node, NodeError> {
        (self.produce)(ctx)?
            .into_iter()
            .find(|child| child.info().name() == name)
            .ok_or_else(|| NodeError::not_found(name))
    }

    fn children(&self, ctx: &Context) -> NodeIter {
        let produce = Arc::clone(&self.produce);
        let ctx = ctx.clone();
        NodeIter::from_fn(move || (*produce)(&ctx))
    }
}

impl fmt::Debug for FuncParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncParent")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Shorthand for a [`ConstLeaf`] node
pub fn file(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Node {
    Node::leaf(ConstLeaf::new(name, content))
}

/// Shorthand for a [`StaticParent`] node
pub fn dir(name: impl Into<String>, children: Vec<Node>) -> Node {
    Node::parent(StaticParent::new(name, children))
}
