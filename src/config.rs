//! Configuration for hashkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::bucket::frame::{EMPTY_PAYLOAD_SIZE, FRAME_HEADER_SIZE, MAX_PAGE_SIZE};
use crate::error::{HashKvError, Result};

/// Default page size in bytes
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Default worst-case size of one encoded entry, used by `Bucket::is_full`
pub const DEFAULT_ENTRY_RESERVE: usize = 64;

/// Main configuration for a hashkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Backing page file. Page `i` occupies `[i * page_size, (i + 1) * page_size)`.
    pub path: PathBuf,

    /// Size of every page (and therefore every bucket) in bytes
    pub page_size: usize,

    /// Sync strategy: whether page writes are fsynced
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// File organization used by the engine
    pub scheme: SchemeKind,

    /// Headroom (in bytes) a bucket keeps for one more entry before it
    /// reports itself full
    pub entry_reserve: usize,
}

/// Page write sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Flush to the OS after every write, let the OS schedule the disk write
    OsBuffered,

    /// fsync after every page write (safest, slowest)
    EveryWrite,
}

/// The file organization backing an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    /// Append-only list of buckets, scanned on lookup
    Naive,

    /// Fixed number of slots, each a chain of buckets
    Static { num_slots: u64 },

    /// Directory of `2^global_depth` slots with bucket splitting and merging
    Extendible,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./hashkv.db"),
            page_size: DEFAULT_PAGE_SIZE,
            sync_strategy: SyncStrategy::OsBuffered,
            scheme: SchemeKind::Extendible,
            entry_reserve: DEFAULT_ENTRY_RESERVE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration for values no scheme can work with
    pub fn validate(&self) -> Result<()> {
        let minimum = FRAME_HEADER_SIZE + EMPTY_PAYLOAD_SIZE;
        if self.page_size <= minimum {
            return Err(HashKvError::Config(format!(
                "page size {} too small, must exceed {} bytes",
                self.page_size, minimum
            )));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(HashKvError::Config(format!(
                "page size {} too large, must not exceed {} bytes",
                self.page_size, MAX_PAGE_SIZE
            )));
        }

        // An empty bucket must not already report itself full
        if minimum.saturating_add(self.entry_reserve) > self.page_size {
            return Err(HashKvError::Config(format!(
                "entry reserve {} leaves no room in a {}-byte page",
                self.entry_reserve, self.page_size
            )));
        }

        if let SchemeKind::Static { num_slots: 0 } = self.scheme {
            return Err(HashKvError::Config(
                "static hashing needs at least one slot".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing page file
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the page size (in bytes)
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the page write sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the hashing scheme
    pub fn scheme(mut self, scheme: SchemeKind) -> Self {
        self.config.scheme = scheme;
        self
    }

    /// Set the per-bucket entry reserve (in bytes)
    pub fn entry_reserve(mut self, bytes: usize) -> Self {
        self.config.entry_reserve = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
