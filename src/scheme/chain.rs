//! Bucket chains
//!
//! An ordered run of buckets grown by appending. The naive scheme is one
//! chain; static hashing keeps one chain per slot.

use std::rc::Rc;

use crate::bucket::{frame, Bucket, BucketKey, BucketValue};
use crate::error::{HashKvError, Result};
use crate::storage::SharedPageStore;

pub(super) struct Chain<K, V> {
    store: SharedPageStore,
    entry_reserve: usize,
    buckets: Vec<Bucket<K, V>>,
}

impl<K: BucketKey, V: BucketValue> Chain<K, V> {
    pub(super) fn new(store: SharedPageStore, entry_reserve: usize) -> Self {
        Self {
            store,
            entry_reserve,
            buckets: Vec::new(),
        }
    }

    /// Scan the buckets in order for `key`
    pub(super) fn find(&self, key: &K) -> Result<Option<V>> {
        for bucket in &self.buckets {
            if let Some(value) = bucket.find(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Insert into the last bucket, appending a new one when it is full
    pub(super) fn insert(&mut self, key: K, value: V) -> Result<bool> {
        let entry_size = Bucket::<K, V>::entry_size(&key, &value)?;
        frame::check_entry_fits(entry_size, self.store.borrow().page_size())?;

        if self.find(&key)?.is_some() {
            return Ok(false);
        }

        let needs_bucket = match self.buckets.last() {
            Some(last) => last.is_full()?,
            None => true,
        };
        if needs_bucket {
            self.append()?;
        }

        if let Some(last) = self.buckets.last() {
            match last.insert(key.clone(), value.clone()) {
                Err(HashKvError::CapacityExceeded { .. }) => {}
                result => return result,
            }
        }

        // The reserve underestimated this entry; it fits an empty page
        self.append()?.insert(key, value)
    }

    /// Remove `key` from the first bucket holding it
    pub(super) fn remove(&mut self, key: &K) -> Result<bool> {
        for bucket in &self.buckets {
            if bucket.remove(key)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Number of buckets (pages) in the chain
    pub(super) fn len(&self) -> usize {
        self.buckets.len()
    }

    fn append(&mut self) -> Result<&Bucket<K, V>> {
        let bucket = Bucket::new(Rc::clone(&self.store), 0, self.entry_reserve)?;
        tracing::trace!("Chain grew to {} buckets", self.buckets.len() + 1);
        self.buckets.push(bucket);
        Ok(&self.buckets[self.buckets.len() - 1])
    }
}
