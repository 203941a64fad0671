//! Naive scheme
//!
//! Every new entry goes to the end of an append-only list of buckets;
//! lookups scan the list front to back.

use crate::bucket::{BucketKey, BucketValue};
use crate::config::DEFAULT_ENTRY_RESERVE;
use crate::error::Result;
use crate::storage::SharedPageStore;

use super::chain::Chain;
use super::HashingScheme;

/// Append-only file organization
pub struct NaiveScheme<K, V> {
    buckets: Chain<K, V>,
}

impl<K: BucketKey, V: BucketValue> NaiveScheme<K, V> {
    pub fn new(store: SharedPageStore) -> Self {
        Self::with_entry_reserve(store, DEFAULT_ENTRY_RESERVE)
    }

    pub fn with_entry_reserve(store: SharedPageStore, entry_reserve: usize) -> Self {
        Self {
            buckets: Chain::new(store, entry_reserve),
        }
    }

    /// Number of buckets allocated so far
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl<K: BucketKey, V: BucketValue> HashingScheme<K, V> for NaiveScheme<K, V> {
    fn insert(&mut self, key: K, value: V) -> Result<bool> {
        self.buckets.insert(key, value)
    }

    fn get(&self, key: &K) -> Result<Option<V>> {
        self.buckets.find(key)
    }

    fn remove(&mut self, key: &K) -> Result<bool> {
        self.buckets.remove(key)
    }

    fn name(&self) -> &'static str {
        "naive"
    }
}
