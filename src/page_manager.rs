//! # Page Manager
//!
//! The blob manager never touches the device directly for page state; it
//! goes through the `PageManager` trait, which the full database implements
//! with its transactional page cache. This module defines that contract and
//! `CachedPageManager`, a minimal single-threaded implementation that is
//! sufficient for the blob layer: a flat page cache over the device, a free
//! pool of returned runs, and the "last blob page" allocation hint.
//!
//! ## The Last-Blob-Page Hint
//!
//! Small blobs are packed onto shared pages. The hint remembers the page
//! the previous allocation landed on so the next allocation can try that
//! page's freelist before asking for fresh space. It is an in-memory hint
//! only, never persisted, and clearing it is always correct.
//!
//! ## Dirty Pages
//!
//! The blob manager marks pages dirty as it writes into their buffers;
//! nothing reaches the file until `flush_all` pushes every dirty page
//! through the device and fsyncs. Mapped page buffers are written back
//! through pwrite as well rather than relying on the kernel syncing the
//! mapping.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use eyre::Result;

use crate::device::DiskDevice;
use crate::page::Page;

/// Flags for `PageManager::fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchFlags {
    /// The caller will not mutate the page; a caching implementation may
    /// skip copy-on-write bookkeeping.
    pub read_only: bool,
    /// The page is a continuation page of a multi-page run and carries no
    /// page-run header.
    pub no_header: bool,
}

impl FetchFlags {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn no_header() -> Self {
        Self {
            no_header: true,
            ..Self::default()
        }
    }
}

/// Page allocation and caching contract consumed by the blob manager.
pub trait PageManager {
    /// Returns the cached page at `address`, reading it through the device
    /// on first access.
    fn fetch(&mut self, address: u64, flags: FetchFlags) -> Result<&mut Page>;

    /// Allocates a contiguous run of `num_pages` pages and returns the
    /// first page, backed by a fresh zeroed heap buffer.
    fn alloc_blob_run(&mut self, num_pages: u32) -> Result<&mut Page>;

    /// Returns a whole run to the free pool.
    fn free_run(&mut self, address: u64, num_pages: u32) -> Result<()>;

    /// Address of the page the previous blob allocation landed on, if it
    /// still has free space.
    fn last_blob_page(&self) -> Option<u64>;

    fn set_last_blob_page(&mut self, address: Option<u64>);
}

/// A flat page cache over a `DiskDevice`, plus a free pool of returned runs.
pub struct CachedPageManager {
    device: Arc<DiskDevice>,
    pages: HashMap<u64, Page>,
    free_runs: Vec<(u64, u32)>,
    last_blob_page: Option<u64>,
}

impl CachedPageManager {
    pub fn new(device: Arc<DiskDevice>) -> Self {
        Self {
            device,
            pages: HashMap::new(),
            free_runs: Vec::new(),
            last_blob_page: None,
        }
    }

    pub fn device(&self) -> &Arc<DiskDevice> {
        &self.device
    }

    /// Number of pages currently cached.
    pub fn cached_pages(&self) -> usize {
        self.pages.len()
    }

    /// Writes every dirty page through the device, then fsyncs.
    pub fn flush_all(&mut self) -> Result<()> {
        for page in self.pages.values_mut() {
            if page.is_dirty() {
                self.device.write(page.address(), page.data())?;
                page.set_dirty(false);
            }
        }
        self.device.flush()
    }

    fn page_size(&self) -> u64 {
        self.device.config().page_size_bytes as u64
    }
}

impl PageManager for CachedPageManager {
    fn fetch(&mut self, address: u64, flags: FetchFlags) -> Result<&mut Page> {
        debug_assert_eq!(address % self.page_size(), 0);
        match self.pages.entry(address) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let mut page = Page::new(address);
                page.set_without_header(flags.no_header);
                self.device.read_page(&mut page, address)?;
                Ok(entry.insert(page))
            }
        }
    }

    fn alloc_blob_run(&mut self, num_pages: u32) -> Result<&mut Page> {
        let page_size = self.page_size();
        let address = match self
            .free_runs
            .iter()
            .position(|&(_, pages)| pages == num_pages)
        {
            Some(pos) => self.free_runs.swap_remove(pos).0,
            None => self.device.alloc(num_pages as u64 * page_size)?,
        };

        let mut page = Page::new(address);
        page.assign_owned_buffer(vec![0u8; page_size as usize].into_boxed_slice(), address);
        page.set_dirty(true);

        match self.pages.entry(address) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = page;
                Ok(slot)
            }
            Entry::Vacant(entry) => Ok(entry.insert(page)),
        }
    }

    fn free_run(&mut self, address: u64, num_pages: u32) -> Result<()> {
        // The first page stays cached: its freshly reset header must shadow
        // the stale on-disk bytes until the next flush.
        let page_size = self.page_size();
        for i in 1..num_pages {
            if let Some(mut page) = self.pages.remove(&(address + i as u64 * page_size)) {
                self.device.free_page(&mut page);
            }
        }
        self.free_runs.push((address, num_pages));
        Ok(())
    }

    fn last_blob_page(&self) -> Option<u64> {
        self.last_blob_page
    }

    fn set_last_blob_page(&mut self, address: Option<u64>) {
        self.last_blob_page = address;
    }
}
