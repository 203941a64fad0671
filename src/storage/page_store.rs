//! Page Store
//!
//! Reads and writes fixed-size pages of a single backing file.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::bucket::frame::MAX_PAGE_SIZE;
use crate::config::{Config, SyncStrategy};
use crate::error::{HashKvError, Result};

use super::PageId;

/// Running page access counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStats {
    /// Full page reads
    pub reads: u64,
    /// Partial page reads
    pub peeks: u64,
    /// Page writes
    pub writes: u64,
}

impl IoStats {
    /// Page accesses that transferred a full page
    pub fn page_accesses(&self) -> u64 {
        self.reads + self.writes
    }
}

/// Fixed-size page file with an in-memory allocation map
///
/// ## Allocation
/// - `last_used_page`: highest allocated id (`None` while empty)
/// - `free_pages`: released ids below `last_used_page`, handed out again
///   before the file grows
pub struct PageStore {
    /// Backing file, held open for the store's lifetime
    file: File,
    /// Path of the backing file
    path: PathBuf,
    /// Size of every page in bytes
    page_size: usize,
    /// Whether writes are fsynced
    sync_strategy: SyncStrategy,
    /// Highest allocated page id
    last_used_page: Option<PageId>,
    /// Released ids available for reuse
    free_pages: HashSet<PageId>,
    /// Access counters
    stats: IoStats,
}

impl PageStore {
    /// Open or create a page file with an empty allocation map
    ///
    /// An existing file is not truncated; its pages are simply overwritten as
    /// ids are allocated again.
    pub fn open(path: &Path, page_size: usize) -> Result<Self> {
        Self::open_with(path, page_size, SyncStrategy::OsBuffered, None, HashSet::new())
    }

    /// Open the page file described by a config
    pub fn open_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::open_with(
            &config.path,
            config.page_size,
            config.sync_strategy,
            None,
            HashSet::new(),
        )
    }

    /// Open a page file resuming a known allocation state
    pub fn open_with(
        path: &Path,
        page_size: usize,
        sync_strategy: SyncStrategy,
        last_used_page: Option<PageId>,
        free_pages: HashSet<PageId>,
    ) -> Result<Self> {
        if page_size == 0 {
            return Err(HashKvError::Config("page size must be non-zero".to_string()));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(HashKvError::Config(format!(
                "page size {} exceeds the {}-byte maximum",
                page_size, MAX_PAGE_SIZE
            )));
        }

        if let Some(&bad) = free_pages
            .iter()
            .find(|&&id| last_used_page.map_or(true, |last| id >= last))
        {
            return Err(HashKvError::Config(format!(
                "free page {} is not below the last used page {:?}",
                bad, last_used_page
            )));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        tracing::debug!(
            "Opened page file {} (page_size={}, last_used_page={:?})",
            path.display(),
            page_size,
            last_used_page
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
            page_size,
            sync_strategy,
            last_used_page,
            free_pages,
            stats: IoStats::default(),
        })
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Hand out a page id, reusing a released one when possible
    pub fn allocate(&mut self) -> PageId {
        let reused = self.free_pages.iter().next().copied();
        let page_id = match reused {
            Some(id) => {
                self.free_pages.remove(&id);
                id
            }
            None => {
                let id = self.last_used_page.map_or(0, |last| last + 1);
                self.last_used_page = Some(id);
                id
            }
        };

        tracing::trace!("Allocated page {}", page_id);
        page_id
    }

    /// Mark a page reusable
    ///
    /// Releasing the highest page moves the cursor down instead, past any
    /// free pages that end up on top, so sequential release shrinks the file.
    pub fn release(&mut self, page_id: PageId) -> Result<()> {
        self.ensure_allocated(page_id)?;

        if Some(page_id) == self.last_used_page {
            let mut last = page_id.checked_sub(1);
            while let Some(id) = last {
                if !self.free_pages.remove(&id) {
                    break;
                }
                last = id.checked_sub(1);
            }
            self.last_used_page = last;
        } else {
            self.free_pages.insert(page_id);
        }

        tracing::trace!("Released page {}", page_id);
        Ok(())
    }

    // =========================================================================
    // Page I/O
    // =========================================================================

    /// Read one full page into `buf`
    ///
    /// Bytes that were never written read back as zeros.
    pub fn read(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<()> {
        if buf.len() != self.page_size {
            return Err(HashKvError::InvalidPageSize {
                expected: self.page_size,
                actual: buf.len(),
            });
        }

        self.ensure_allocated(page_id)?;
        self.stats.reads += 1;
        self.read_prefix(page_id, buf)
    }

    /// Read only the first `n` bytes of a page into `buf[..n]`
    pub fn peek(&mut self, page_id: PageId, n: usize, buf: &mut [u8]) -> Result<()> {
        if n > self.page_size {
            return Err(HashKvError::PeekTooLarge {
                requested: n,
                page_size: self.page_size,
            });
        }
        if buf.len() < n {
            return Err(HashKvError::InvalidPageSize {
                expected: n,
                actual: buf.len(),
            });
        }

        self.ensure_allocated(page_id)?;
        self.stats.peeks += 1;
        self.read_prefix(page_id, &mut buf[..n])
    }

    /// Write one full page and flush it
    pub fn write(&mut self, page_id: PageId, buf: &[u8]) -> Result<()> {
        if buf.len() != self.page_size {
            return Err(HashKvError::InvalidPageSize {
                expected: self.page_size,
                actual: buf.len(),
            });
        }

        self.ensure_allocated(page_id)?;
        self.stats.writes += 1;

        self.file.seek(SeekFrom::Start(self.offset(page_id)))?;
        self.file.write_all(buf)?;
        self.file.flush()?;

        if self.sync_strategy == SyncStrategy::EveryWrite {
            self.file.sync_data()?;
        }

        tracing::trace!("Wrote page {}", page_id);
        Ok(())
    }

    /// Force all written pages to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    // =========================================================================
    // Instrumentation
    // =========================================================================

    /// Snapshot of the access counters
    pub fn stats(&self) -> IoStats {
        self.stats
    }

    /// Zero the access counters
    pub fn reset_stats(&mut self) {
        self.stats = IoStats::default();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Size of every page in bytes
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Highest allocated page id
    pub fn last_used_page(&self) -> Option<PageId> {
        self.last_used_page
    }

    /// Number of pages between the start of the file and the cursor
    pub fn page_count(&self) -> u64 {
        self.last_used_page.map_or(0, |last| last + 1)
    }

    /// Number of released pages waiting for reuse
    pub fn free_page_count(&self) -> usize {
        self.free_pages.len()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn offset(&self, page_id: PageId) -> u64 {
        page_id * self.page_size as u64
    }

    fn ensure_allocated(&self, page_id: PageId) -> Result<()> {
        let in_range = self.last_used_page.map_or(false, |last| page_id <= last);
        if !in_range || self.free_pages.contains(&page_id) {
            return Err(HashKvError::InvalidPage(page_id));
        }
        Ok(())
    }

    /// Fill `buf` from the page start, zero-filling past end of file
    fn read_prefix(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(self.offset(page_id)))?;

        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buf[filled..].fill(0);

        Ok(())
    }
}
