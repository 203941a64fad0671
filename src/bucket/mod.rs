//! Bucket Module
//!
//! One hash bucket stored on exactly one page.
//!
//! ## Responsibilities
//! - Present a key→value mapping over a single page
//! - Enforce page capacity before any write reaches the page
//! - Answer `is_full` / `is_empty` from a peeked page prefix
//!
//! Every mutation is a full read-modify-write of the page. The mapping is
//! never cached in memory, so the page is the only copy of the bucket.

pub mod frame;

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{HashKvError, Result};
use crate::storage::{PageId, SharedPageStore};

use frame::PEEK_SIZE;

/// Types usable as bucket keys
pub trait BucketKey: Serialize + DeserializeOwned + Eq + Hash + Clone {}

impl<T> BucketKey for T where T: Serialize + DeserializeOwned + Eq + Hash + Clone {}

/// Types usable as bucket values
pub trait BucketValue: Serialize + DeserializeOwned + Clone {}

impl<T> BucketValue for T where T: Serialize + DeserializeOwned + Clone {}

/// A key→value mapping confined to one page
///
/// The page is allocated on construction and released when the bucket is
/// dropped.
pub struct Bucket<K, V> {
    /// Page store performing the I/O
    store: SharedPageStore,
    /// Page backing this bucket
    page_id: PageId,
    /// Number of directory bits routing to this bucket
    local_depth: Cell<u32>,
    /// Headroom kept free for one more entry
    entry_reserve: usize,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K: BucketKey, V: BucketValue> Bucket<K, V> {
    /// Allocate a page and initialize it as an empty bucket
    pub fn new(store: SharedPageStore, local_depth: u32, entry_reserve: usize) -> Result<Self> {
        let page_id = store.borrow_mut().allocate();
        let bucket = Self {
            store,
            page_id,
            local_depth: Cell::new(local_depth),
            entry_reserve,
            _marker: PhantomData,
        };

        bucket.clear()?;
        Ok(bucket)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Look up the value stored for `key`
    pub fn find(&self, key: &K) -> Result<Option<V>> {
        let mut map = self.entries()?;
        Ok(map.remove(key))
    }

    /// Check whether `key` is stored in this bucket
    pub fn contains(&self, key: &K) -> Result<bool> {
        Ok(self.entries()?.contains_key(key))
    }

    /// Decode the whole mapping from the page
    pub fn entries(&self) -> Result<HashMap<K, V>> {
        let mut page = vec![0u8; self.page_size()];
        self.store.borrow_mut().read(self.page_id, &mut page)?;

        let payload = frame::decode_page(&page)?;
        if payload.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(bincode::deserialize(payload)?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a new entry
    ///
    /// Returns `Ok(false)` without writing if `key` is already present, and
    /// `CapacityExceeded` without writing if the entry does not fit.
    pub fn insert(&self, key: K, value: V) -> Result<bool> {
        let mut map = self.entries()?;
        if map.contains_key(&key) {
            return Ok(false);
        }

        map.insert(key, value);
        self.replace(&map)?;
        Ok(true)
    }

    /// Remove an entry, returning `Ok(false)` if `key` was absent
    pub fn remove(&self, key: &K) -> Result<bool> {
        let mut map = self.entries()?;
        if map.remove(key).is_none() {
            return Ok(false);
        }

        self.replace(&map)?;
        Ok(true)
    }

    /// Overwrite the page with `map`
    ///
    /// Capacity is checked before the page is touched.
    pub fn replace(&self, map: &HashMap<K, V>) -> Result<()> {
        let payload = bincode::serialize(map)?;
        let page = frame::encode_page(&payload, self.page_size())?;
        self.store.borrow_mut().write(self.page_id, &page)
    }

    /// Reset the bucket to an empty mapping
    pub fn clear(&self) -> Result<()> {
        self.replace(&HashMap::new())
    }

    // =========================================================================
    // Capacity
    // =========================================================================

    /// True if one more entry of `entry_reserve` bytes would not fit
    pub fn is_full(&self) -> Result<bool> {
        let prefix = self.peek_prefix()?;
        let header = frame::decode_header(&prefix)?;
        Ok(header.frame_len() + self.entry_reserve > self.page_size())
    }

    /// True if the bucket holds no entries
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of entries, read from the page prefix
    pub fn len(&self) -> Result<usize> {
        let prefix = self.peek_prefix()?;
        let count = frame::peek_entry_count(&prefix)?;
        usize::try_from(count)
            .map_err(|_| HashKvError::Corruption(format!("entry count {} out of range", count)))
    }

    /// Encoded size of a single entry inside a bucket payload
    pub fn entry_size(key: &K, value: &V) -> Result<usize> {
        Ok(bincode::serialized_size(&(key, value))? as usize)
    }

    fn peek_prefix(&self) -> Result<[u8; PEEK_SIZE]> {
        let mut prefix = [0u8; PEEK_SIZE];
        self.store
            .borrow_mut()
            .peek(self.page_id, PEEK_SIZE, &mut prefix)?;
        Ok(prefix)
    }
}

impl<K, V> Bucket<K, V> {
    /// Page backing this bucket
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Number of directory bits routing to this bucket
    pub fn local_depth(&self) -> u32 {
        self.local_depth.get()
    }

    /// Record a new local depth after a split or merge
    pub fn set_local_depth(&self, depth: u32) {
        self.local_depth.set(depth);
    }

    /// Page size of the underlying store
    pub fn page_size(&self) -> usize {
        self.store.borrow().page_size()
    }
}

impl<K, V> Drop for Bucket<K, V> {
    fn drop(&mut self) {
        match self.store.try_borrow_mut() {
            Ok(mut store) => {
                if let Err(e) = store.release(self.page_id) {
                    tracing::warn!("Failed to release page {}: {}", self.page_id, e);
                }
            }
            Err(_) => {
                tracing::warn!("Page store busy, page {} not released", self.page_id);
            }
        }
    }
}

impl<K, V> std::fmt::Debug for Bucket<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("page_id", &self.page_id)
            .field("local_depth", &self.local_depth.get())
            .finish()
    }
}
