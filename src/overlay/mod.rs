//! Per-node function overlay
//!
//! [`apply_per_node_funcs`] wraps a directory so every level gains a `...` child
//! holding whatever the [`PerNodeFunc`]s compute for each original entry. Given
//!
//! ```text
//! parent/
//! └─dir1/
//!   ├─fileA
//!   ├─fileB
//!   └─dir2/
//! ```
//!
//! the wrapped tree reads as
//!
//! ```text
//! parent/
//! ├─.../
//! │ └─dir1/       additions computed for dir1/
//! └─dir1/
//!   ├─.../
//!   │ ├─fileA/    additions computed for fileA
//!   │ ├─fileB/    additions computed for fileB
//!   │ └─dir2/     additions computed for dir2/
//!   ├─fileA
//!   ├─fileB
//!   └─dir2/
//!     └─.../
//! ```
//!
//! Browsing the original entries never runs a function; only descending into
//! `.../<entry>/` does. A view of `/path/to/file` is reached at
//! `/path/to/.../file/<view>`. Additions that are directories get their own `...`.
//!
//! An original entry literally named `...` still appears in listings, after the
//! synthetic one, but lookup by that name always returns the synthetic one. This
//! keeps both reserved directories visible when a tree is wrapped twice.

mod adds;
mod diagnostics;
mod func;
mod wrap;

pub use adds::{additions_dir, AdditionsDir, EntryAdditionsDir};
pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use func::{per_node_func, FnPerNodeFunc, PerNodeFunc, PerNodeFuncs};
pub use wrap::{apply_per_node_funcs, recurse, OverlayParent};

/// Name of the synthetic additions directory at every overlay level
pub const ADDS_DIR_NAME: &str = "...";

/// Execute bits forced onto every per-entry additions directory
pub const TRAVERSE_BITS: u32 = 0o111;
