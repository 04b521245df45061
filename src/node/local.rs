//! Local filesystem nodes
//!
//! Exposes a real directory as a read-only node tree. Metadata is captured when a
//! node is created; directory listings are read lazily and sorted by name for
//! determinism.

use super::{FileInfo, Leaf, Node, NodeIter, Parent};
use crate::context::Context;
use crate::error::NodeError;
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;

/// A directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalDir {
    path: PathBuf,
    info: FileInfo,
}

/// A regular file on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    info: FileInfo,
}

impl LocalDir {
    /// Open `root` as the top of a node tree.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = dunce::canonicalize(root.as_ref())?;
        let metadata = fs::metadata(&path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string());
        if !metadata.is_dir() {
            return Err(NodeError::NotADirectory { name });
        }
        Ok(Self {
            info: info_from_metadata(name, &metadata),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Parent for LocalDir {
    fn info(&self) -> FileInfo {
        self.info.clone()
    }

    fn child(&self, ctx: &Context, name: &str) -> Result<Node, NodeError> {
        ctx.check()?;
        if !is_plain_name(name) {
            return Err(NodeError::not_found(name));
        }
        match node_at(self.path.join(name), name.to_string()) {
            Err(NodeError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                Err(NodeError::not_found(name))
            }
            other => other,
        }
    }

    fn children(&self, ctx: &Context) -> NodeIter {
        let path = self.path.clone();
        let ctx = ctx.clone();
        NodeIter::from_fn_results(move || read_dir_sorted(&ctx, &path))
    }
}

impl Leaf for LocalFile {
    fn info(&self) -> FileInfo {
        self.info.clone()
    }

    fn open(&self, ctx: &Context) -> Result<Box<dyn Read + Send>, NodeError> {
        ctx.check()?;
        Ok(Box::new(fs::File::open(&self.path)?))
    }
}

/// List a directory, one result per entry so a single unreadable entry does not
/// hide its siblings.
fn read_dir_sorted(ctx: &Context, path: &Path) -> Result<Vec<Result<Node, NodeError>>, NodeError> {
    ctx.check()?;
    let mut names: Vec<OsString> = Vec::new();
    for entry in fs::read_dir(path)? {
        names.push(entry?.file_name());
    }
    names.sort();
    debug!(path = %path.display(), entry_count = names.len(), "Listed local directory");

    // Stat through the raw name; the lossy form is only for display.
    Ok(names
        .into_iter()
        .map(|name| {
            ctx.check()?;
            let display_name = name.to_string_lossy().into_owned();
            node_at(path.join(&name), display_name)
        })
        .collect())
}

fn node_at(path: PathBuf, name: String) -> Result<Node, NodeError> {
    let metadata = fs::metadata(&path)?;
    let info = info_from_metadata(name, &metadata);
    if metadata.is_dir() {
        Ok(Node::parent(LocalDir { path, info }))
    } else {
        Ok(Node::leaf(LocalFile { path, info }))
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/') && !name.contains('\\')
}

fn info_from_metadata(name: String, metadata: &fs::Metadata) -> FileInfo {
    let base = if metadata.is_dir() {
        FileInfo::dir(name)
    } else {
        FileInfo::file(name).with_size(metadata.len())
    };
    base.with_mode_perm(mode_perm(metadata))
        .with_mod_time(metadata.modified().unwrap_or(UNIX_EPOCH))
}

#[cfg(unix)]
fn mode_perm(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn mode_perm(metadata: &fs::Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, true) => 0o555,
        (true, false) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}
