//! Lazy child sequences
//!
//! A [`NodeIter`] yields `Result<Node, NodeError>` items. A failed item does not
//! invalidate the items already yielded, and combinators never materialize the
//! underlying sequence.

use super::Node;
use crate::error::NodeError;

type BoxedIter = Box<dyn Iterator<Item = Result<Node, NodeError>> + Send>;

/// Lazy, possibly failing sequence of nodes
pub struct NodeIter {
    inner: BoxedIter,
}

impl NodeIter {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<Node, NodeError>> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn once(node: Node) -> Self {
        Self::new(std::iter::once(Ok(node)))
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self::new(nodes.into_iter().map(Ok))
    }

    pub fn from_results(items: Vec<Result<Node, NodeError>>) -> Self {
        Self::new(items.into_iter())
    }

    /// Defer producing the whole list until the first item is pulled.
    ///
    /// If `produce` fails the sequence yields that single error and ends.
    pub fn from_fn<F>(produce: F) -> Self
    where
        F: FnOnce() -> Result<Vec<Node>, NodeError> + Send + 'static,
    {
        Self::from_fn_results(move || Ok(produce()?.into_iter().map(Ok).collect()))
    }

    /// Like [`NodeIter::from_fn`], but individual items may carry their own errors.
    pub fn from_fn_results<F>(produce: F) -> Self
    where
        F: FnOnce() -> Result<Vec<Result<Node, NodeError>>, NodeError> + Send + 'static,
    {
        Self::new(
            std::iter::once_with(produce).flat_map(|produced| match produced {
                Ok(items) => items,
                Err(err) => vec![Err(err)],
            }),
        )
    }

    /// Concatenate `next` after this sequence.
    pub fn chain(self, next: NodeIter) -> Self {
        Self::new(self.inner.chain(next.inner))
    }

    /// Transform each successfully produced node; errors pass through untouched.
    pub fn map_nodes<F>(self, mut f: F) -> Self
    where
        F: FnMut(Node) -> Result<Node, NodeError> + Send + 'static,
    {
        Self::new(self.inner.map(move |item| item.and_then(&mut f)))
    }

    /// Drop nodes whose name fails `keep`; errors pass through untouched.
    pub fn filter_names<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&str) -> bool + Send + 'static,
    {
        Self::new(self.inner.filter(move |item| match item {
            Ok(node) => keep(node.info().name()),
            Err(_) => true,
        }))
    }

    /// Collect every node, stopping at the first error.
    pub fn collect_nodes(self) -> Result<Vec<Node>, NodeError> {
        self.collect()
    }
}

impl Iterator for NodeIter {
    type Item = Result<Node, NodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
