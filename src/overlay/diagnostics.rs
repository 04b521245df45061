//! Non-fatal diagnostics emitted while computing additions

use parking_lot::Mutex;
use std::fmt;
use tracing::warn;

/// A recoverable condition noticed during computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `func` produced an addition named `name` for `entry` that replaced an
    /// earlier addition of the same name.
    NameConflict {
        entry: String,
        name: String,
        func: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NameConflict { entry, name, func } => write!(
                f,
                "conflict for added name {:?} under {:?}; output of func {:?} wins",
                name, entry, func
            ),
        }
    }
}

/// Receives diagnostics; injected so callers choose where they go
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Default sink: forwards to `tracing` at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::NameConflict { entry, name, func } => {
                warn!(entry = %entry, name = %name, func = %func, "Conflict for added name");
            }
        }
    }
}

/// Sink that keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    pub fn clear(&self) {
        self.diagnostics.lock().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}
