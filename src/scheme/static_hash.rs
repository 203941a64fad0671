//! Static hashing
//!
//! A fixed number of slots, `slot = hash(key) % num_slots`. Each slot is a
//! chain of buckets created on first use and grown by appending; the slot
//! count never changes.

use std::rc::Rc;

use crate::bucket::{BucketKey, BucketValue};
use crate::config::DEFAULT_ENTRY_RESERVE;
use crate::error::{HashKvError, Result};
use crate::storage::SharedPageStore;

use super::chain::Chain;
use super::{HashFn, HashingScheme};

/// Fixed-slot hashing with overflow chains
pub struct StaticHashing<K, V> {
    hash_fn: HashFn<K>,
    slots: Vec<Chain<K, V>>,
}

impl<K: BucketKey, V: BucketValue> StaticHashing<K, V> {
    pub fn new(store: SharedPageStore, num_slots: u64, hash_fn: HashFn<K>) -> Result<Self> {
        Self::with_entry_reserve(store, num_slots, hash_fn, DEFAULT_ENTRY_RESERVE)
    }

    pub fn with_entry_reserve(
        store: SharedPageStore,
        num_slots: u64,
        hash_fn: HashFn<K>,
        entry_reserve: usize,
    ) -> Result<Self> {
        if num_slots == 0 {
            return Err(HashKvError::Config(
                "static hashing needs at least one slot".to_string(),
            ));
        }

        let slots = (0..num_slots)
            .map(|_| Chain::new(Rc::clone(&store), entry_reserve))
            .collect();

        Ok(Self { hash_fn, slots })
    }

    /// Number of slots, fixed at construction
    pub fn num_slots(&self) -> u64 {
        self.slots.len() as u64
    }

    /// Number of buckets chained off `slot`
    pub fn chain_len(&self, slot: u64) -> usize {
        self.slots.get(slot as usize).map_or(0, |chain| chain.len())
    }

    /// Number of buckets allocated across all slots
    pub fn bucket_count(&self) -> usize {
        self.slots.iter().map(|chain| chain.len()).sum()
    }

    fn slot(&self, key: &K) -> usize {
        ((self.hash_fn)(key) % self.num_slots()) as usize
    }
}

impl<K: BucketKey, V: BucketValue> HashingScheme<K, V> for StaticHashing<K, V> {
    fn insert(&mut self, key: K, value: V) -> Result<bool> {
        let slot = self.slot(&key);
        self.slots[slot].insert(key, value)
    }

    fn get(&self, key: &K) -> Result<Option<V>> {
        self.slots[self.slot(key)].find(key)
    }

    fn remove(&mut self, key: &K) -> Result<bool> {
        let slot = self.slot(key);
        self.slots[slot].remove(key)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
