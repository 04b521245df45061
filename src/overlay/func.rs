//! Per-node functions and the ordered list the overlay carries

use super::diagnostics::{DiagnosticSink, TracingSink};
use crate::context::Context;
use crate::error::NodeError;
use crate::node::Node;
use std::fmt;
use std::sync::Arc;

/// Computes nodes to add alongside one input node
///
/// An overlay may call `apply` once per listing per entry, with no memoization in
/// between, so implementations that list a [`Parent`](crate::node::Parent)'s
/// children should cap how many they read and fall back to returning nothing for
/// very large directories. Expensive work is best placed behind its own
/// subdirectory so browsing only pays for it on request.
pub trait PerNodeFunc: Send + Sync {
    /// Identifies the function in errors and diagnostics.
    fn name(&self) -> &str;

    fn apply(&self, ctx: &Context, node: &Node) -> Result<Vec<Node>, NodeError>;
}

/// [`PerNodeFunc`] backed by a closure
pub struct FnPerNodeFunc<F> {
    name: String,
    func: F,
}

impl<F> PerNodeFunc for FnPerNodeFunc<F>
where
    F: Fn(&Context, &Node) -> Result<Vec<Node>, NodeError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ctx: &Context, node: &Node) -> Result<Vec<Node>, NodeError> {
        (self.func)(ctx, node)
    }
}

/// Wrap a closure as a shareable [`PerNodeFunc`].
pub fn per_node_func<F>(name: impl Into<String>, func: F) -> Arc<dyn PerNodeFunc>
where
    F: Fn(&Context, &Node) -> Result<Vec<Node>, NodeError> + Send + Sync + 'static,
{
    Arc::new(FnPerNodeFunc {
        name: name.into(),
        func,
    })
}

/// Ordered per-node functions plus the sink that receives their conflict diagnostics
///
/// The list is copied at construction; cloning shares it. Order matters: when two
/// additions for the same entry share a name, the later one wins.
#[derive(Clone)]
pub struct PerNodeFuncs {
    funcs: Arc<[Arc<dyn PerNodeFunc>]>,
    sink: Arc<dyn DiagnosticSink>,
}

impl PerNodeFuncs {
    pub fn new(funcs: Vec<Arc<dyn PerNodeFunc>>) -> Self {
        Self {
            funcs: Arc::from(funcs),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PerNodeFunc>> {
        self.funcs.iter()
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    pub fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }

    pub fn names(&self) -> Vec<&str> {
        self.funcs.iter().map(|func| func.name()).collect()
    }
}

impl FromIterator<Arc<dyn PerNodeFunc>> for PerNodeFuncs {
    fn from_iter<I: IntoIterator<Item = Arc<dyn PerNodeFunc>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for PerNodeFuncs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerNodeFuncs")
            .field("funcs", &self.names())
            .finish_non_exhaustive()
    }
}
