//! Tests for NaiveScheme and StaticHashing
//!
//! These tests verify:
//! - Insert / get / remove for both chained organizations
//! - Duplicate detection across every bucket of a chain
//! - Chain growth when buckets fill
//! - Several schemes sharing one page store

use std::rc::Rc;

use hashkv::scheme::{default_hash_fn, HashFn};
use hashkv::storage::{self, PageStore, SharedPageStore};
use hashkv::{ExtendibleHashing, HashKvError, HashingScheme, NaiveScheme, StaticHashing};
use tempfile::TempDir;

const PAGE_SIZE: usize = 1024;

/// Encoded size of one (i32, i32) entry; a bucket is full at 126 of them
const INT_ENTRY_SIZE: usize = 8;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, SharedPageStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = PageStore::open(&temp_dir.path().join("chain.db"), PAGE_SIZE).unwrap();
    (temp_dir, storage::shared(store))
}

fn identity_hash() -> HashFn<i32> {
    Box::new(|key: &i32| *key as u64)
}

fn naive(store: &SharedPageStore) -> NaiveScheme<i32, i32> {
    NaiveScheme::with_entry_reserve(Rc::clone(store), INT_ENTRY_SIZE)
}

fn static_table(store: &SharedPageStore, num_slots: u64) -> StaticHashing<i32, i32> {
    StaticHashing::with_entry_reserve(Rc::clone(store), num_slots, identity_hash(), INT_ENTRY_SIZE)
        .unwrap()
}

// =============================================================================
// Naive Scheme Tests
// =============================================================================

#[test]
fn test_naive_starts_without_pages() {
    let (_temp, store) = setup_temp_store();
    let scheme = naive(&store);

    assert_eq!(scheme.bucket_count(), 0);
    assert_eq!(scheme.get(&1).unwrap(), None);
    assert_eq!(scheme.name(), "naive");
    assert_eq!(store.borrow().page_count(), 0);
}

#[test]
fn test_naive_insert_get_remove() {
    let (_temp, store) = setup_temp_store();
    let mut scheme = naive(&store);

    assert!(scheme.insert(4, 2).unwrap());
    assert_eq!(scheme.get(&4).unwrap(), Some(2));

    assert!(scheme.remove(&4).unwrap());
    assert_eq!(scheme.get(&4).unwrap(), None);
    assert!(!scheme.remove(&4).unwrap());
}

#[test]
fn test_naive_grows_by_appending() {
    let (_temp, store) = setup_temp_store();
    let mut scheme = naive(&store);

    // 126 + 126 + 48
    for i in 0..300 {
        assert!(scheme.insert(i, i * 10).unwrap());
    }

    assert_eq!(scheme.bucket_count(), 3);
    assert_eq!(store.borrow().page_count(), 3);
    for i in 0..300 {
        assert_eq!(scheme.get(&i).unwrap(), Some(i * 10));
    }
}

#[test]
fn test_naive_duplicate_in_earlier_bucket() {
    let (_temp, store) = setup_temp_store();
    let mut scheme = naive(&store);
    for i in 0..200 {
        scheme.insert(i, i).unwrap();
    }

    // Key 5 sits in the first bucket, key 150 in the second
    assert!(!scheme.insert(5, -1).unwrap());
    assert!(!scheme.insert(150, -1).unwrap());

    assert_eq!(scheme.get(&5).unwrap(), Some(5));
    assert_eq!(scheme.get(&150).unwrap(), Some(150));
    assert_eq!(scheme.bucket_count(), 2);
}

#[test]
fn test_naive_removed_key_can_be_reinserted() {
    let (_temp, store) = setup_temp_store();
    let mut scheme = naive(&store);
    for i in 0..200 {
        scheme.insert(i, i).unwrap();
    }

    assert!(scheme.remove(&3).unwrap());
    assert!(scheme.insert(3, 33).unwrap());

    assert_eq!(scheme.get(&3).unwrap(), Some(33));
}

#[test]
fn test_naive_oversized_entry_is_rejected() {
    let (_temp, store) = setup_temp_store();
    let mut scheme: NaiveScheme<Vec<u8>, Vec<u8>> = NaiveScheme::new(Rc::clone(&store));

    let result = scheme.insert(b"big".to_vec(), vec![0u8; PAGE_SIZE]);

    assert!(matches!(result, Err(HashKvError::CapacityExceeded { .. })));
    assert_eq!(scheme.bucket_count(), 0);
}

#[test]
fn test_naive_zero_reserve_relies_on_capacity_errors() {
    let temp_dir = TempDir::new().unwrap();
    let store = storage::shared(
        PageStore::open(&temp_dir.path().join("small.db"), 256).unwrap(),
    );
    let mut scheme: NaiveScheme<String, String> =
        NaiveScheme::with_entry_reserve(Rc::clone(&store), 0);

    for i in 0..50 {
        assert!(scheme
            .insert(format!("key-{}", i), format!("value-{}", i))
            .unwrap());
    }

    assert!(scheme.bucket_count() > 1);
    for i in 0..50 {
        assert_eq!(
            scheme.get(&format!("key-{}", i)).unwrap(),
            Some(format!("value-{}", i))
        );
    }
}

// =============================================================================
// Static Hashing Tests
// =============================================================================

#[test]
fn test_static_insert_get_remove() {
    let (_temp, store) = setup_temp_store();
    let mut table = static_table(&store, 10);

    assert!(table.insert(4, 2).unwrap());
    assert_eq!(table.get(&4).unwrap(), Some(2));
    assert_eq!(table.get(&14).unwrap(), None);

    assert!(table.remove(&4).unwrap());
    assert_eq!(table.get(&4).unwrap(), None);
    assert!(!table.remove(&4).unwrap());
    assert_eq!(table.name(), "static");
}

#[test]
fn test_static_zero_slots_fails() {
    let (_temp, store) = setup_temp_store();

    let result: Result<StaticHashing<i32, i32>, _> =
        StaticHashing::new(Rc::clone(&store), 0, identity_hash());

    assert!(matches!(result, Err(HashKvError::Config(_))));
}

#[test]
fn test_static_chains_created_lazily() {
    let (_temp, store) = setup_temp_store();
    let mut table = static_table(&store, 10);
    assert_eq!(table.bucket_count(), 0);

    table.insert(3, 3).unwrap();
    table.insert(13, 13).unwrap();

    assert_eq!(table.num_slots(), 10);
    assert_eq!(table.chain_len(3), 1);
    assert_eq!(table.chain_len(4), 0);
    assert_eq!(table.bucket_count(), 1);
    assert_eq!(table.chain_len(99), 0);
}

#[test]
fn test_static_overflow_chain() {
    let (_temp, store) = setup_temp_store();
    let mut table: StaticHashing<i32, i32> = StaticHashing::with_entry_reserve(
        Rc::clone(&store),
        4,
        Box::new(|_: &i32| 0u64),
        INT_ENTRY_SIZE,
    )
    .unwrap();

    for i in 0..200 {
        assert!(table.insert(i, i).unwrap());
    }

    assert_eq!(table.chain_len(0), 2);
    assert_eq!(table.chain_len(1), 0);
    assert_eq!(table.bucket_count(), 2);

    // Duplicates are found in either bucket of the chain
    assert!(!table.insert(10, -1).unwrap());
    assert!(!table.insert(190, -1).unwrap());
    for i in 0..200 {
        assert_eq!(table.get(&i).unwrap(), Some(i));
    }
}

#[test]
fn test_static_many_keys_default_hash() {
    let (_temp, store) = setup_temp_store();
    let mut table: StaticHashing<i32, i32> =
        StaticHashing::with_entry_reserve(Rc::clone(&store), 8, default_hash_fn(), INT_ENTRY_SIZE)
            .unwrap();

    for i in 0..1000 {
        table.insert(i, i + 1).unwrap();
    }
    for i in (0..1000).step_by(3) {
        assert!(table.remove(&i).unwrap());
    }

    for i in 0..1000 {
        let expected = if i % 3 == 0 { None } else { Some(i + 1) };
        assert_eq!(table.get(&i).unwrap(), expected);
    }
}

// =============================================================================
// Shared Store Tests
// =============================================================================

#[test]
fn test_schemes_share_one_store() {
    let (_temp, store) = setup_temp_store();
    let mut schemes: Vec<Box<dyn HashingScheme<i32, i32>>> = vec![
        Box::new(naive(&store)),
        Box::new(static_table(&store, 5)),
        Box::new(
            ExtendibleHashing::with_entry_reserve(Rc::clone(&store), identity_hash(), INT_ENTRY_SIZE)
                .unwrap(),
        ),
    ];

    // Interleave inserts so the schemes' pages interleave in the file
    for i in 0..400 {
        for (offset, scheme) in schemes.iter_mut().enumerate() {
            scheme.insert(i, i * 10 + offset as i32).unwrap();
        }
    }

    for (offset, scheme) in schemes.iter().enumerate() {
        for i in 0..400 {
            assert_eq!(scheme.get(&i).unwrap(), Some(i * 10 + offset as i32));
        }
    }

    drop(schemes);
    assert_eq!(store.borrow().page_count(), 0);
}
