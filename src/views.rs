//! Built-in Views
//!
//! Ready-made per-node functions. Each one bounds its own work: content hashing
//! reads at most `max_hash_bytes`, and directory listings give up (returning no
//! additions) past `max_listing_entries` children.

use crate::context::Context;
use crate::error::NodeError;
use crate::node::memory::ConstLeaf;
use crate::node::{FileInfo, Node};
use crate::overlay::{PerNodeFunc, PerNodeFuncs};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Name of the leaf added by [`ContentHashView`]
pub const CONTENT_HASH_NAME: &str = "blake3";
/// Name of the leaf added by [`ListingView`]
pub const LISTING_NAME: &str = "listing.txt";
/// Name of the leaf added by [`StatView`]
pub const STAT_NAME: &str = "stat.json";

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Built-in view selector used in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    ContentHash,
    Listing,
    Stat,
}

/// Built-in view configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewsConfig {
    /// Views to apply, in order; later views win name conflicts
    #[serde(default = "default_enabled")]
    pub enabled: Vec<ViewKind>,

    /// Directories with more children than this get no listing
    #[serde(default = "default_max_listing_entries")]
    pub max_listing_entries: usize,

    /// Upper bound on bytes hashed per file
    #[serde(default = "default_max_hash_bytes")]
    pub max_hash_bytes: u64,

    /// Cache hint for derived leaves; unset means inherit the source node's hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cacheable_for_secs: Option<u64>,
}

pub(crate) fn default_enabled() -> Vec<ViewKind> {
    vec![ViewKind::ContentHash, ViewKind::Listing, ViewKind::Stat]
}

pub(crate) fn default_max_listing_entries() -> usize {
    1000
}

pub(crate) fn default_max_hash_bytes() -> u64 {
    64 * 1024 * 1024 // 64 MiB
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_listing_entries: default_max_listing_entries(),
            max_hash_bytes: default_max_hash_bytes(),
            cacheable_for_secs: None,
        }
    }
}

impl ViewsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_listing_entries == 0 {
            return Err("max_listing_entries must be greater than zero".to_string());
        }
        if self.max_hash_bytes == 0 {
            return Err("max_hash_bytes must be greater than zero".to_string());
        }
        for (i, kind) in self.enabled.iter().enumerate() {
            if self.enabled[..i].contains(kind) {
                return Err(format!("view {:?} is enabled more than once", kind));
            }
        }
        Ok(())
    }

    /// Instantiate the enabled views in configured order.
    pub fn build_funcs(&self) -> PerNodeFuncs {
        let cacheable_for = self.cacheable_for_secs.map(Duration::from_secs);
        self.enabled
            .iter()
            .map(|kind| -> Arc<dyn PerNodeFunc> {
                match kind {
                    ViewKind::ContentHash => Arc::new(
                        ContentHashView::new(self.max_hash_bytes).with_cacheable_for(cacheable_for),
                    ),
                    ViewKind::Listing => Arc::new(
                        ListingView::new(self.max_listing_entries).with_cacheable_for(cacheable_for),
                    ),
                    ViewKind::Stat => Arc::new(StatView::new().with_cacheable_for(cacheable_for)),
                }
            })
            .collect()
    }
}

/// Adds a `blake3` leaf holding the hex digest of a file's content
#[derive(Debug, Clone)]
pub struct ContentHashView {
    max_bytes: u64,
    cacheable_for: Option<Duration>,
}

impl ContentHashView {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            cacheable_for: None,
        }
    }

    /// Override the cache hint of the produced leaf.
    pub fn with_cacheable_for(mut self, cacheable_for: Option<Duration>) -> Self {
        self.cacheable_for = cacheable_for;
        self
    }
}

impl PerNodeFunc for ContentHashView {
    fn name(&self) -> &str {
        "content-hash"
    }

    fn apply(&self, ctx: &Context, node: &Node) -> Result<Vec<Node>, NodeError> {
        let leaf = match node {
            Node::Leaf(leaf) => leaf,
            Node::Parent(_) => return Ok(vec![]),
        };
        let info = leaf.info();
        if info.size() > self.max_bytes {
            debug!(name = %info.name(), size = info.size(), "Skipping hash of oversized file");
            return Ok(vec![]);
        }

        let mut reader = leaf.open(ctx)?.take(self.max_bytes);
        let mut hasher = blake3::Hasher::new();
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            ctx.check()?;
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        let digest = hex::encode(hasher.finalize().as_bytes());
        Ok(vec![derived_leaf(
            CONTENT_HASH_NAME,
            &info,
            self.cacheable_for,
            format!("{}\n", digest),
        )])
    }
}

/// Adds a `listing.txt` leaf naming a directory's children, one per line
#[derive(Debug, Clone)]
pub struct ListingView {
    max_entries: usize,
    cacheable_for: Option<Duration>,
}

impl ListingView {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            cacheable_for: None,
        }
    }

    pub fn with_cacheable_for(mut self, cacheable_for: Option<Duration>) -> Self {
        self.cacheable_for = cacheable_for;
        self
    }
}

impl PerNodeFunc for ListingView {
    fn name(&self) -> &str {
        "listing"
    }

    fn apply(&self, ctx: &Context, node: &Node) -> Result<Vec<Node>, NodeError> {
        let parent = match node {
            Node::Parent(parent) => parent,
            Node::Leaf(_) => return Ok(vec![]),
        };

        let mut lines = Vec::new();
        for child in parent.children(ctx).take(self.max_entries.saturating_add(1)) {
            ctx.check()?;
            let child = child?;
            let suffix = if child.is_parent() { "/" } else { "" };
            lines.push(format!("{}{}", child.name(), suffix));
        }
        if lines.len() > self.max_entries {
            debug!(name = %parent.info().name(), limit = self.max_entries, "Directory too large to list");
            return Ok(vec![]);
        }
        lines.sort();

        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        Ok(vec![derived_leaf(
            LISTING_NAME,
            &parent.info(),
            self.cacheable_for,
            content,
        )])
    }
}

/// Serialized metadata written by [`StatView`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStat {
    pub name: String,
    pub kind: String,
    pub mode: String,
    pub size: u64,
    /// RFC 3339 modification time; `None` when outside the representable range
    pub modified: Option<String>,
    pub cacheable_for_secs: Option<u64>,
}

impl NodeStat {
    pub fn from_node(node: &Node) -> Self {
        let info = node.info();
        Self {
            name: info.name().to_string(),
            kind: if node.is_parent() { "directory" } else { "file" }.to_string(),
            mode: format!("{:04o}", info.mode_perm()),
            size: info.size(),
            modified: rfc3339(info.mod_time()),
            cacheable_for_secs: node.cacheable_for().map(|d| d.as_secs()),
        }
    }
}

fn rfc3339(time: SystemTime) -> Option<String> {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok()?, after.subsec_nanos()),
        Err(err) => {
            let before = err.duration();
            let secs = i64::try_from(before.as_secs()).ok()?.checked_neg()?;
            match before.subsec_nanos() {
                0 => (secs, 0),
                nanos => (secs.checked_sub(1)?, 1_000_000_000 - nanos),
            }
        }
    };
    DateTime::<Utc>::from_timestamp(secs, nanos).map(|t| t.to_rfc3339())
}

/// Adds a `stat.json` leaf describing any node's metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct StatView {
    cacheable_for: Option<Duration>,
}

impl StatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cacheable_for(mut self, cacheable_for: Option<Duration>) -> Self {
        self.cacheable_for = cacheable_for;
        self
    }
}

impl PerNodeFunc for StatView {
    fn name(&self) -> &str {
        "stat"
    }

    fn apply(&self, ctx: &Context, node: &Node) -> Result<Vec<Node>, NodeError> {
        ctx.check()?;
        let stat = NodeStat::from_node(node);
        let content = serde_json::to_vec_pretty(&stat)?;
        Ok(vec![derived_leaf(
            STAT_NAME,
            &node.info(),
            self.cacheable_for,
            content,
        )])
    }
}

/// Leaf named `name` with the source's modification time. The cache hint is
/// `cacheable_for` when set, else the source's.
fn derived_leaf(
    name: &str,
    source: &FileInfo,
    cacheable_for: Option<Duration>,
    content: impl Into<Vec<u8>>,
) -> Node {
    Node::leaf(ConstLeaf::with_info(
        FileInfo::file(name)
            .with_mod_time(source.mod_time())
            .with_cacheable_for(cacheable_for.or(source.cacheable_for())),
        content,
    ))
}
