//! # hashkv
//!
//! A disk-resident key-value index with:
//! - A fixed-size paged file with page reuse and access counters
//! - Page-backed buckets with CRC-checked, length-prefixed framing
//! - Three interchangeable file organizations: naive, static hashing and
//!   extendible hashing
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Engine / hashkv shell                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  HashingScheme { insert, get, remove }
//!       ┌───────────────┼─────────────────────┐
//!       ▼               ▼                     ▼
//! ┌───────────┐  ┌──────────────┐  ┌─────────────────────┐
//! │   Naive   │  │    Static    │  │     Extendible      │
//! │  (chain)  │  │ (slot chains)│  │ (directory + split) │
//! └─────┬─────┘  └──────┬───────┘  └──────────┬──────────┘
//!       └───────────────┼─────────────────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │    Bucket    │  one bucket = one page
//!               └──────┬───────┘
//!                      ▼
//!               ┌──────────────┐
//!               │  Page Store  │  fixed-size pages, one file
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod bucket;
pub mod scheme;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HashKvError, Result};
pub use config::Config;
pub use engine::Engine;
pub use scheme::{ExtendibleHashing, HashingScheme, NaiveScheme, StaticHashing};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of hashkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
