//! Error types for hashkv
//!
//! Provides a unified error type for all operations.
//!
//! Missing and duplicate keys are not errors: the hashing schemes report them
//! as boolean results.

use thiserror::Error;

use crate::storage::PageId;

/// Result type alias using HashKvError
pub type Result<T> = std::result::Result<T, HashKvError>;

/// Unified error type for hashkv operations
#[derive(Debug, Error)]
pub enum HashKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Page Store Errors
    // -------------------------------------------------------------------------
    #[error("Page {0} is not allocated")]
    InvalidPage(PageId),

    #[error("Invalid page buffer size: expected {expected}, got {actual}")]
    InvalidPageSize { expected: usize, actual: usize },

    #[error("Cannot peek {requested} bytes from a {page_size}-byte page")]
    PeekTooLarge { requested: usize, page_size: usize },

    // -------------------------------------------------------------------------
    // Bucket Errors
    // -------------------------------------------------------------------------
    #[error("Capacity exceeded: {required} bytes needed, page holds {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    #[error("Page corruption detected: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Directory Errors
    // -------------------------------------------------------------------------
    #[error("Directory cannot grow past global depth {0}")]
    DirectoryOverflow(u32),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<bincode::Error> for HashKvError {
    fn from(e: bincode::Error) -> Self {
        HashKvError::Serialization(e.to_string())
    }
}
