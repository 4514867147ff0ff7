//! # LodeDB Blob Storage
//!
//! The on-disk blob storage engine of the LodeDB embedded key-value
//! database: variable-sized byte records multiplexed onto fixed-size pages,
//! addressed by a stable 64-bit blob-id, with zero-copy reads out of a
//! memory-mapped window.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        DiskBlobManager (blobs)           │
//! │  allocate / read / overwrite / erase     │
//! ├─────────────────────────────────────────┤
//! │   PageManager trait + CachedPageManager  │
//! │  page cache, run allocation, last-page   │
//! │  hint, dirty-page flushing               │
//! ├─────────────────────────────────────────┤
//! │             DiskDevice                   │
//! │  pread/pwrite, mmap window, EOF excess   │
//! │  reserve, optional page cipher           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! A blob-id is the absolute file offset of the blob's header. The header
//! stores that offset back (`self_id`), making every blob self-identifying:
//! reads validate the id before trusting the region, so a stale id fails
//! cleanly instead of returning foreign bytes.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use lodedb::{
//!     CachedPageManager, DiskBlobManager, DiskDevice, ReadFlags, Record,
//!     StoreConfig, WriteFlags,
//! };
//!
//! let mut device = DiskDevice::new(StoreConfig::default());
//! device.create("app.lode")?;
//! let device = Arc::new(device);
//!
//! let mut pages = CachedPageManager::new(device.clone());
//! let mut blobs = DiskBlobManager::new(device);
//!
//! let id = blobs.allocate(&mut pages, &Record::new(b"payload"),
//!     WriteFlags::default(), None)?;
//!
//! let mut arena = Vec::new();
//! let bytes = blobs.read(&mut pages, id, ReadFlags::default(), None, &mut arena)?;
//! assert_eq!(bytes, b"payload");
//!
//! pages.flush_all()?;
//! ```
//!
//! ## Storage Layout
//!
//! A store file is a sequence of fixed-size pages. Pages are grouped into
//! contiguous *runs*; the first page of a run starts with a
//! [`headers::BlobPageHeader`] (run length, free-byte counter, and a bounded
//! freelist of reusable gaps), and the remaining pages are raw payload
//! space. Small blobs share single-page runs; a blob larger than a page
//! gets a run of its own.
//!
//! ## Concurrency Model
//!
//! One environment serializes all blob operations; the structures here are
//! single-threaded by design. The device carries its own lock so that its
//! primitives stay safe under concurrent readers, and zero-copy reads are
//! lifetime-checked against the mmap window (see [`device`]).

pub mod blobs;
pub mod compress;
pub mod config;
pub mod device;
pub mod error;
pub mod headers;
pub mod page;
pub mod page_manager;
pub mod record;

pub use blobs::{CompressionMetrics, DiskBlobManager};
pub use compress::Compressor;
pub use config::{PosixAdvice, StoreConfig, DEFAULT_PAGE_SIZE};
pub use device::{DiskDevice, PageCipher};
pub use error::{store_error, StoreError};
pub use headers::{BlobHeader, BlobPageHeader, BLOB_HEADER_SIZE, FREELIST_SLOTS, PAGE_OVERHEAD};
pub use page::Page;
pub use page_manager::{CachedPageManager, FetchFlags, PageManager};
pub use record::{ReadFlags, Record, WriteFlags};
