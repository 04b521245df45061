//! File metadata carried by every node

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const DEFAULT_FILE_PERM: u32 = 0o444;
const DEFAULT_DIR_PERM: u32 = 0o555;

/// Name, permission bits, modification time and cache hint of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    name: String,
    mode_perm: u32,
    mod_time: SystemTime,
    is_dir: bool,
    size: u64,
    cacheable_for: Option<Duration>,
}

impl FileInfo {
    /// Read-only regular file info with an epoch modification time
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode_perm: DEFAULT_FILE_PERM,
            mod_time: UNIX_EPOCH,
            is_dir: false,
            size: 0,
            cacheable_for: None,
        }
    }

    /// Read-only, traversable directory info with an epoch modification time
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode_perm: DEFAULT_DIR_PERM,
            mod_time: UNIX_EPOCH,
            is_dir: true,
            size: 0,
            cacheable_for: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_mod_time(mut self, mod_time: SystemTime) -> Self {
        self.mod_time = mod_time;
        self
    }

    /// Set permission bits; anything outside `0o777` is dropped.
    pub fn with_mode_perm(mut self, mode_perm: u32) -> Self {
        self.mode_perm = mode_perm & 0o777;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_cacheable_for(mut self, cacheable_for: Option<Duration>) -> Self {
        self.cacheable_for = cacheable_for;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode_perm(&self) -> u32 {
        self.mode_perm
    }

    pub fn mod_time(&self) -> SystemTime {
        self.mod_time
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn cacheable_for(&self) -> Option<Duration> {
        self.cacheable_for
    }
}
