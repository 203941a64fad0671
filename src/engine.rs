//! Engine Module
//!
//! Byte-keyed index over the configured hashing scheme.
//!
//! ## Responsibilities
//! - Open the page file described by the config
//! - Build the configured file organization on top of it
//! - Route shell commands to the scheme
//! - Expose page access counters

use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::config::{Config, SchemeKind};
use crate::error::Result;
use crate::protocol::{Command, Response};
use crate::scheme::{
    default_hash_fn, ExtendibleHashing, HashingScheme, NaiveScheme, StaticHashing,
};
use crate::storage::{self, IoStats, PageStore, SharedPageStore};

/// Scheme over raw byte keys and values
pub type ByteScheme = Box<dyn HashingScheme<Vec<u8>, Vec<u8>>>;

/// The main index engine
///
/// Single-threaded: the engine, its scheme and every bucket share one page
/// store through an `Rc<RefCell<_>>` handle, so an engine is neither `Send`
/// nor `Sync`.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Page file shared by all buckets
    store: SharedPageStore,

    /// File organization selected by `config.scheme`
    scheme: ByteScheme,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// The page file is reused but its previous contents are not indexed:
    /// every run starts from an empty scheme.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = storage::shared(PageStore::open_config(&config)?);
        let scheme = build_scheme(&config, &store)?;

        tracing::info!(
            "Opened {} index on {} (page_size={})",
            scheme.name(),
            config.path.display(),
            config.page_size
        );

        Ok(Self {
            config,
            store,
            scheme,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified page file
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().path(path).build();
        Self::open(config)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&mut self, command: Command) -> Result<Response> {
        let response = match command {
            Command::Get { key } => match self.get(&key)? {
                Some(value) => Response::ok(Some(value)),
                None => Response::not_found(),
            },
            Command::Put { key, value } => {
                if self.put(&key, &value)? {
                    Response::ok(None)
                } else {
                    Response::exists()
                }
            }
            Command::Delete { key } => {
                if self.delete(&key)? {
                    Response::ok(None)
                } else {
                    Response::not_found()
                }
            }
            Command::Stats => {
                let stats = self.stats();
                Response::ok(Some(
                    format!(
                        "reads={} peeks={} writes={} pages={}",
                        stats.reads,
                        stats.peeks,
                        stats.writes,
                        self.page_count()
                    )
                    .into_bytes(),
                ))
            }
            Command::ResetStats => {
                self.reset_stats();
                Response::ok(None)
            }
            Command::Ping => Response::ok(Some(b"PONG".to_vec())),
        };

        Ok(response)
    }

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.scheme.get(&key.to_vec())
    }

    /// Insert a key-value pair, returning `false` if the key already exists
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<bool> {
        self.scheme.insert(key.to_vec(), value.to_vec())
    }

    /// Delete a key, returning `false` if it was absent
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        self.scheme.remove(&key.to_vec())
    }

    /// Sync the page file and close the engine
    pub fn close(self) -> Result<()> {
        self.store.borrow_mut().sync()?;
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Page access counters since open or the last reset
    pub fn stats(&self) -> IoStats {
        self.store.borrow().stats()
    }

    /// Zero the page access counters
    pub fn reset_stats(&self) {
        self.store.borrow_mut().reset_stats();
    }

    /// Pages between the start of the file and the allocation cursor
    pub fn page_count(&self) -> u64 {
        self.store.borrow().page_count()
    }

    /// Name of the active scheme
    pub fn scheme_name(&self) -> &'static str {
        self.scheme.name()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Build the scheme selected by `config` over `store`
pub fn build_scheme(config: &Config, store: &SharedPageStore) -> Result<ByteScheme> {
    let store = Rc::clone(store);
    let reserve = config.entry_reserve;

    let scheme: ByteScheme = match config.scheme {
        SchemeKind::Naive => Box::new(NaiveScheme::with_entry_reserve(store, reserve)),
        SchemeKind::Static { num_slots } => Box::new(StaticHashing::with_entry_reserve(
            store,
            num_slots,
            default_hash_fn(),
            reserve,
        )?),
        SchemeKind::Extendible => Box::new(ExtendibleHashing::with_entry_reserve(
            store,
            default_hash_fn(),
            reserve,
        )?),
    };

    Ok(scheme)
}
