//! Storage Module
//!
//! Fixed-size paged file underneath every bucket.
//!
//! ## Responsibilities
//! - Allocate and release page ids, reusing released ids
//! - Read, partially read ("peek") and write whole pages by id
//! - Count page accesses for comparing file organizations
//!
//! ## File Format
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬─────┐
//! │   Page 0     │   Page 1     │   Page 2     │ ... │
//! │ (page_size)  │ (page_size)  │ (page_size)  │     │
//! └──────────────┴──────────────┴──────────────┴─────┘
//! ```
//!
//! There is no header page. The allocation cursor and the free list live in
//! memory only, so page contents are meaningful only while the structure that
//! allocated them is alive.

mod page_store;

use std::cell::RefCell;
use std::rc::Rc;

pub use page_store::{IoStats, PageStore};

/// Page identifier: page `id` starts at byte `id * page_size`
pub type PageId = u64;

/// Page store handle shared by every bucket of a scheme
pub type SharedPageStore = Rc<RefCell<PageStore>>;

/// Wrap a page store into the handle buckets and schemes share
pub fn shared(store: PageStore) -> SharedPageStore {
    Rc::new(RefCell::new(store))
}
