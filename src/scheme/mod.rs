//! Scheme Module
//!
//! File organizations mapping keys to page-backed buckets.
//!
//! ## Schemes
//! - [`NaiveScheme`]: append-only list of buckets, scanned on lookup
//! - [`StaticHashing`]: `hash(key) % num_slots` selects a chain of buckets
//! - [`ExtendibleHashing`]: low-order hash bits select a directory slot;
//!   buckets split and merge as they fill and empty
//!
//! All three implement [`HashingScheme`] and are interchangeable behind
//! `Box<dyn HashingScheme<K, V>>`.

mod chain;
mod extendible;
mod naive;
mod static_hash;

use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

use crate::error::Result;

pub use extendible::{ExtendibleHashing, SlotInfo, MAX_GLOBAL_DEPTH};
pub use naive::NaiveScheme;
pub use static_hash::StaticHashing;

/// Hash function used to route keys
pub type HashFn<K> = Box<dyn Fn(&K) -> u64>;

/// Uniform key→value contract shared by every file organization
pub trait HashingScheme<K, V> {
    /// Insert a new entry
    ///
    /// Returns `Ok(false)` and leaves the stored value untouched if `key` is
    /// already present.
    fn insert(&mut self, key: K, value: V) -> Result<bool>;

    /// Look up the value stored for `key`
    fn get(&self, key: &K) -> Result<Option<V>>;

    /// Remove an entry, returning `Ok(false)` if `key` was absent
    fn remove(&mut self, key: &K) -> Result<bool>;

    /// Short name of the scheme, for logs and the shell
    fn name(&self) -> &'static str;
}

/// xxHash64 (seed 0) of a key's `Hash` output
pub fn default_hash<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Boxed [`default_hash`]
pub fn default_hash_fn<K: Hash + 'static>() -> HashFn<K> {
    Box::new(|key: &K| default_hash(key))
}
