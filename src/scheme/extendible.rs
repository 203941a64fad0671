//! Extendible Hashing
//!
//! A directory of `2^global_depth` slots indexed by the low-order bits of a
//! key's hash. Slots share a bucket while the bucket's `local_depth` is below
//! the global depth.
//!
//! ## Directory Example (global_depth = 2)
//! ```text
//!   slot 00 ──┐
//!   slot 10 ──┴──▶ bucket A (local_depth 1)
//!   slot 01 ─────▶ bucket B (local_depth 2)
//!   slot 11 ─────▶ bucket C (local_depth 2)
//! ```
//!
//! ## Structure Changes
//! - **Split**: a full bucket gets a sibling; entries whose hash has bit
//!   `local_depth` set move to the sibling, as do the slots with that bit set.
//!   The directory doubles first if the bucket already uses every bit.
//! - **Merge**: an emptied bucket hands its slots to its equal-depth sibling.
//!   The directory halves when no bucket uses every bit any more.
//!
//! Directory changes only re-point in-memory handles; page I/O happens inside
//! the buckets.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::bucket::{frame, Bucket, BucketKey, BucketValue};
use crate::config::DEFAULT_ENTRY_RESERVE;
use crate::error::{HashKvError, Result};
use crate::storage::{PageId, SharedPageStore};

use super::{HashFn, HashingScheme};

/// Deepest directory allowed by default (16M slots)
pub const MAX_GLOBAL_DEPTH: u32 = 24;

/// Snapshot of one directory slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    /// Page of the bucket the slot routes to
    pub page_id: PageId,
    /// Local depth of that bucket
    pub local_depth: u32,
}

/// Extendible hashing over page-backed buckets
pub struct ExtendibleHashing<K, V> {
    /// Page store shared with every bucket
    store: SharedPageStore,
    /// Routes keys to slots
    hash_fn: HashFn<K>,
    /// Number of hash bits used to index the directory
    global_depth: u32,
    /// Upper bound on `global_depth`
    max_global_depth: u32,
    /// Buckets created so far, including merged-away ones
    num_buckets: usize,
    /// Headroom passed to every new bucket
    entry_reserve: usize,
    /// `2^global_depth` slots; several slots may share one bucket
    directory: Vec<Rc<Bucket<K, V>>>,
}

impl<K: BucketKey, V: BucketValue> ExtendibleHashing<K, V> {
    /// Create a table with a single empty bucket
    pub fn new(store: SharedPageStore, hash_fn: HashFn<K>) -> Result<Self> {
        Self::with_entry_reserve(store, hash_fn, DEFAULT_ENTRY_RESERVE)
    }

    /// Create a table whose buckets keep `entry_reserve` bytes of headroom
    pub fn with_entry_reserve(
        store: SharedPageStore,
        hash_fn: HashFn<K>,
        entry_reserve: usize,
    ) -> Result<Self> {
        let bucket = Bucket::new(Rc::clone(&store), 0, entry_reserve)?;

        Ok(Self {
            store,
            hash_fn,
            global_depth: 0,
            max_global_depth: MAX_GLOBAL_DEPTH,
            num_buckets: 1,
            entry_reserve,
            directory: vec![Rc::new(bucket)],
        })
    }

    /// Limit how far the directory may grow
    pub fn with_max_global_depth(mut self, depth: u32) -> Self {
        self.max_global_depth = depth.min(MAX_GLOBAL_DEPTH);
        self
    }

    // =========================================================================
    // Routing
    // =========================================================================

    fn hash(&self, key: &K) -> u64 {
        (self.hash_fn)(key)
    }

    /// Slot for `key`: the low `global_depth` bits of its hash
    fn bucket_index(&self, key: &K) -> usize {
        (self.hash(key) & ((1u64 << self.global_depth) - 1)) as usize
    }

    /// Slot differing from `slot` in the last bit a bucket of `local_depth`
    /// routes on
    fn sibling_index(slot: usize, local_depth: u32) -> usize {
        slot ^ (1 << (local_depth - 1))
    }

    // =========================================================================
    // Directory Changes
    // =========================================================================

    /// Double the directory; the new upper half mirrors the lower half
    fn grow(&mut self) -> Result<()> {
        if self.global_depth >= self.max_global_depth {
            return Err(HashKvError::DirectoryOverflow(self.max_global_depth));
        }

        self.directory.extend_from_within(..);
        self.global_depth += 1;

        tracing::debug!(
            "Directory grew to global_depth={} ({} slots)",
            self.global_depth,
            self.directory.len()
        );
        Ok(())
    }

    /// Halve the directory if no bucket uses all `global_depth` bits
    fn try_shrink(&mut self) -> bool {
        if self.global_depth == 0
            || self
                .directory
                .iter()
                .any(|bucket| bucket.local_depth() == self.global_depth)
        {
            return false;
        }

        self.global_depth -= 1;
        self.directory.truncate(1 << self.global_depth);

        tracing::debug!(
            "Directory shrank to global_depth={} ({} slots)",
            self.global_depth,
            self.directory.len()
        );
        true
    }

    /// Split the bucket at `slot` into itself and a new sibling
    ///
    /// On failure the directory is left as it was, shrunk back if it had to
    /// grow for this split.
    fn split(&mut self, slot: usize) -> Result<()> {
        let bucket = Rc::clone(&self.directory[slot]);
        let grew = bucket.local_depth() == self.global_depth;
        if grew {
            self.grow()?;
        }

        let result = self.split_bucket(&bucket);
        if result.is_err() && grew {
            self.try_shrink();
        }
        result
    }

    /// Write both halves of `bucket`, then re-point the directory
    fn split_bucket(&mut self, bucket: &Rc<Bucket<K, V>>) -> Result<()> {
        let new_bit = 1usize << bucket.local_depth();
        let new_depth = bucket.local_depth() + 1;

        // Rehash: entries with the new bit set move to the sibling
        let (moved, kept): (HashMap<K, V>, HashMap<K, V>) = bucket
            .entries()?
            .into_iter()
            .partition(|(key, _)| self.hash(key) & new_bit as u64 != 0);

        // Dropping the sibling on any error below releases its page
        let sibling = Rc::new(Bucket::new(
            Rc::clone(&self.store),
            new_depth,
            self.entry_reserve,
        )?);
        sibling.replace(&moved)?;
        bucket.replace(&kept)?;

        self.num_buckets += 1;
        bucket.set_local_depth(new_depth);
        for (index, entry) in self.directory.iter_mut().enumerate() {
            if index & new_bit != 0 && Rc::ptr_eq(entry, bucket) {
                *entry = Rc::clone(&sibling);
            }
        }

        tracing::debug!(
            "Split page {} at local_depth={}: {} kept, {} moved to page {}",
            bucket.page_id(),
            new_depth,
            kept.len(),
            moved.len(),
            sibling.page_id()
        );
        Ok(())
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Number of hash bits used to index the directory
    pub fn global_depth(&self) -> u32 {
        self.global_depth
    }

    /// Buckets created so far, including merged-away ones
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Buckets currently reachable from the directory
    pub fn distinct_buckets(&self) -> usize {
        self.directory
            .iter()
            .map(|bucket| bucket.page_id())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of directory slots (`2^global_depth`)
    pub fn directory_len(&self) -> usize {
        self.directory.len()
    }

    /// Page and local depth behind every slot, in slot order
    pub fn slots(&self) -> Vec<SlotInfo> {
        self.directory
            .iter()
            .map(|bucket| SlotInfo {
                page_id: bucket.page_id(),
                local_depth: bucket.local_depth(),
            })
            .collect()
    }

    /// Entry count of every distinct bucket, in order of first slot
    pub fn bucket_sizes(&self) -> Result<Vec<usize>> {
        let mut seen = HashSet::new();
        let mut sizes = Vec::new();
        for bucket in &self.directory {
            if seen.insert(bucket.page_id()) {
                sizes.push(bucket.len()?);
            }
        }
        Ok(sizes)
    }

    /// Verify the depth invariants of the directory
    ///
    /// For every bucket of local depth `d`: `d <= global_depth`, all of its
    /// slots agree on their low `d` bits, and it owns exactly
    /// `2^(global_depth - d)` slots.
    pub fn check_invariants(&self) -> Result<()> {
        if self.directory.len() != 1 << self.global_depth {
            return Err(HashKvError::Corruption(format!(
                "directory has {} slots at global_depth={}",
                self.directory.len(),
                self.global_depth
            )));
        }

        // page_id -> (local_depth, low bits of first slot, slot count)
        let mut seen: HashMap<PageId, (u32, usize, usize)> = HashMap::new();
        for (index, bucket) in self.directory.iter().enumerate() {
            let depth = bucket.local_depth();
            if depth > self.global_depth {
                return Err(HashKvError::Corruption(format!(
                    "page {} has local_depth={} above global_depth={}",
                    bucket.page_id(),
                    depth,
                    self.global_depth
                )));
            }

            let low_bits = index & ((1 << depth) - 1);
            let record = seen
                .entry(bucket.page_id())
                .or_insert((depth, low_bits, 0));
            if record.1 != low_bits {
                return Err(HashKvError::Corruption(format!(
                    "page {} reached from slots disagreeing on their low {} bits",
                    bucket.page_id(),
                    depth
                )));
            }
            record.2 += 1;
        }

        for (page_id, (depth, _, count)) in seen {
            let expected = 1usize << (self.global_depth - depth);
            if count != expected {
                return Err(HashKvError::Corruption(format!(
                    "page {} owns {} slots, expected {}",
                    page_id, count, expected
                )));
            }
        }

        Ok(())
    }

    fn page_size(&self) -> usize {
        self.store.borrow().page_size()
    }
}

impl<K: BucketKey, V: BucketValue> HashingScheme<K, V> for ExtendibleHashing<K, V> {
    /// Insert, splitting the target bucket until the entry fits
    fn insert(&mut self, key: K, value: V) -> Result<bool> {
        let entry_size = Bucket::<K, V>::entry_size(&key, &value)?;
        frame::check_entry_fits(entry_size, self.page_size())?;

        if self.directory[self.bucket_index(&key)].contains(&key)? {
            return Ok(false);
        }

        loop {
            let slot = self.bucket_index(&key);
            let bucket = &self.directory[slot];

            // An empty bucket gains nothing from a split
            if !bucket.is_full()? || bucket.is_empty()? {
                // The reserve is a hint; the bucket itself has the last word
                match bucket.insert(key.clone(), value.clone()) {
                    Err(HashKvError::CapacityExceeded { .. }) => {}
                    result => return result,
                }
            }

            // All entries may land on one side, so re-resolve and retry
            self.split(slot)?;
        }
    }

    fn get(&self, key: &K) -> Result<Option<V>> {
        self.directory[self.bucket_index(key)].find(key)
    }

    /// Remove, merging emptied buckets into their siblings
    fn remove(&mut self, key: &K) -> Result<bool> {
        let mut slot = self.bucket_index(key);
        let mut bucket = Rc::clone(&self.directory[slot]);
        if !bucket.remove(key)? {
            return Ok(false);
        }

        while self.global_depth > 0 && bucket.local_depth() > 0 && bucket.is_empty()? {
            let sibling_slot = Self::sibling_index(slot, bucket.local_depth());
            let sibling = Rc::clone(&self.directory[sibling_slot]);
            if sibling.local_depth() != bucket.local_depth() {
                break;
            }

            for entry in self.directory.iter_mut() {
                if Rc::ptr_eq(entry, &bucket) {
                    *entry = Rc::clone(&sibling);
                }
            }
            sibling.set_local_depth(sibling.local_depth() - 1);

            tracing::debug!(
                "Merged empty page {} into page {} (local_depth={})",
                bucket.page_id(),
                sibling.page_id(),
                sibling.local_depth()
            );

            // Dropping the last handle releases the emptied page
            bucket = sibling;
            slot = sibling_slot;

            if !self.try_shrink() {
                break;
            }
            slot &= self.directory.len() - 1;
        }

        Ok(true)
    }

    fn name(&self) -> &'static str {
        "extendible"
    }
}
