//! The `...` directory and the per-entry directories beneath it

use super::diagnostics::Diagnostic;
use super::func::PerNodeFuncs;
use super::wrap::recurse;
use super::{ADDS_DIR_NAME, TRAVERSE_BITS};
use crate::context::Context;
use crate::error::NodeError;
use crate::node::{FileInfo, Node, NodeIter, Parent};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Read-only `...` directory: one child directory per original entry
pub struct AdditionsDir {
    original: Arc<dyn Parent>,
    funcs: PerNodeFuncs,
}

/// Build the `...` directory for `original` without wrapping `original` itself.
pub fn additions_dir(original: Arc<dyn Parent>, funcs: PerNodeFuncs) -> Arc<dyn Parent> {
    Arc::new(AdditionsDir::new(original, funcs))
}

impl AdditionsDir {
    pub fn new(original: Arc<dyn Parent>, funcs: PerNodeFuncs) -> Self {
        Self { original, funcs }
    }
}

impl Parent for AdditionsDir {
    fn info(&self) -> FileInfo {
        self.original.info().with_name(ADDS_DIR_NAME)
    }

    fn child(&self, ctx: &Context, name: &str) -> Result<Node, NodeError> {
        let entry = self.original.child(ctx, name)?;
        Ok(Node::parent(EntryAdditionsDir::new(entry, self.funcs.clone())))
    }

    fn children(&self, ctx: &Context) -> NodeIter {
        let funcs = self.funcs.clone();
        self.original
            .children(ctx)
            .map_nodes(move |entry| Ok(Node::parent(EntryAdditionsDir::new(entry, funcs.clone()))))
    }

    fn cacheable_for(&self) -> Option<Duration> {
        self.original.cacheable_for()
    }
}

/// Directory holding the additions computed for a single original entry
///
/// Children are recomputed on every `child` / `children` call.
#[derive(Clone)]
pub struct EntryAdditionsDir {
    entry: Node,
    info: FileInfo,
    funcs: PerNodeFuncs,
}

impl EntryAdditionsDir {
    pub fn new(entry: Node, funcs: PerNodeFuncs) -> Self {
        let original = entry.info();
        // Must stay traversable even if the original entry was not.
        let info = FileInfo::dir(original.name())
            .with_mod_time(original.mod_time())
            .with_mode_perm(original.mode_perm() | TRAVERSE_BITS)
            .with_cacheable_for(entry.cacheable_for());
        Self { entry, info, funcs }
    }

    /// The original entry these additions were computed for.
    pub fn entry(&self) -> &Node {
        &self.entry
    }

    /// Run every function against the entry and merge the outputs by name.
    ///
    /// Functions run in list order and a later addition replaces an earlier one
    /// with the same name. The first failure aborts the whole computation. The
    /// result is sorted by addition name.
    #[instrument(skip(self, ctx), fields(entry = %self.info.name(), funcs = self.funcs.len()))]
    pub fn compute(&self, ctx: &Context) -> Result<Vec<Node>, NodeError> {
        let entry_name = self.info.name();
        let mut adds: BTreeMap<String, Node> = BTreeMap::new();

        for func in self.funcs.iter() {
            ctx.check()?;
            let func_adds =
                func.apply(ctx, &self.entry)
                    .map_err(|source| NodeError::Computation {
                        func: func.name().to_string(),
                        entry: entry_name.to_string(),
                        source: Box::new(source),
                    })?;

            for add in func_adds {
                let name = add.name();
                if adds.contains_key(&name) {
                    self.funcs.sink().emit(Diagnostic::NameConflict {
                        entry: entry_name.to_string(),
                        name: name.clone(),
                        func: func.name().to_string(),
                    });
                }
                adds.insert(name, add);
            }
        }

        debug!(additions = adds.len(), "Computed additions");
        Ok(adds
            .into_values()
            .map(|add| recurse(add, &self.funcs))
            .collect())
    }
}

impl Parent for EntryAdditionsDir {
    fn info(&self) -> FileInfo {
        self.info.clone()
    }

    fn child(&self, ctx: &Context, name: &str) -> Result<Node, NodeError> {
        self.compute(ctx)?
            .into_iter()
            .find(|add| add.info().name() == name)
            .ok_or_else(|| NodeError::not_found(name))
    }

    fn children(&self, ctx: &Context) -> NodeIter {
        let this = self.clone();
        let ctx = ctx.clone();
        NodeIter::from_fn(move || this.compute(&ctx))
    }

    fn cacheable_for(&self) -> Option<Duration> {
        self.info.cacheable_for()
    }
}
