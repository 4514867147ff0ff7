//! # On-Disk Blob Layout
//!
//! Two headers define the persisted blob format. Both are `#[repr(C)]`
//! zerocopy structs read and written in place on page buffers; fields are
//! stored little-endian with natural alignment (the store targets
//! little-endian platforms, matching the original file format).
//!
//! ## Page-Run Header (72 bytes, offset 0 of the first page of a run)
//!
//! ```text
//! Offset  Size  Field       Description
//! ------  ----  ----------  -------------------------------------------
//! 0       4     num_pages   Length of the contiguous run
//! 4       4     free_bytes  Payload bytes still available on the run
//! 8       64    freelist    8 slots of (offset: u32, size: u32)
//! ```
//!
//! Freelist offsets are run-relative and point past the page overhead.
//! Multi-page runs do not use the freelist; when checksums are enabled,
//! slot 0's offset field instead holds the MurmurHash3-x86-32 of the blob
//! payload.
//!
//! ## Blob Header (24 bytes, at the blob-id offset)
//!
//! ```text
//! Offset  Size  Field       Description
//! ------  ----  ----------  -------------------------------------------
//! 0       8     self_id     Absolute file offset of this header
//! 8       8     size        Logical payload length (pre-compression)
//! 16      4     alloc_size  Physical length including this header
//! 20      4     flags       Bit 0: payload is compressed
//! ```
//!
//! `self_id` makes every blob self-identifying: a read validates it against
//! the requested id before trusting anything else in the header, which
//! guards against stale ids and partially written regions.

use eyre::{ensure, Result};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

use crate::page::Page;

/// Number of freelist slots in every page-run header. Bounded so the header
/// stays small; the smallest gap is evicted when the table overflows.
pub const FREELIST_SLOTS: usize = 8;

/// Bytes reserved at the start of the first page of a run.
pub const PAGE_OVERHEAD: usize = size_of::<BlobPageHeader>();

/// Size of the per-blob header prefix.
pub const BLOB_HEADER_SIZE: usize = size_of::<BlobHeader>();

/// `BlobHeader.flags` bit: the payload bytes are compressed.
pub const BLOB_FLAG_COMPRESSED: u32 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct FreelistSlot {
    offset: u32,
    size: u32,
}

/// Header at offset 0 of the first page of every blob page run.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct BlobPageHeader {
    num_pages: u32,
    free_bytes: u32,
    freelist: [FreelistSlot; FREELIST_SLOTS],
}

impl BlobPageHeader {
    pub fn from_page(page: &Page) -> Result<&Self> {
        Self::from_bytes(page.data())
    }

    pub fn from_page_mut(page: &mut Page) -> Result<&mut Self> {
        Self::from_bytes_mut(page.data_mut())
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ensure!(
            data.len() >= size_of::<Self>(),
            "buffer too small for BlobPageHeader: {} < {}",
            data.len(),
            size_of::<Self>()
        );

        Self::ref_from_bytes(&data[..size_of::<Self>()])
            .map_err(|e| eyre::eyre!("failed to read BlobPageHeader: {:?}", e))
    }

    pub fn from_bytes_mut(data: &mut [u8]) -> Result<&mut Self> {
        ensure!(
            data.len() >= size_of::<Self>(),
            "buffer too small for BlobPageHeader: {} < {}",
            data.len(),
            size_of::<Self>()
        );

        Self::mut_from_bytes(&mut data[..size_of::<Self>()])
            .map_err(|e| eyre::eyre!("failed to read BlobPageHeader: {:?}", e))
    }

    /// Zeroes the header, freelist included.
    pub fn reset(&mut self) {
        *self = Self::new_zeroed();
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub fn set_num_pages(&mut self, num_pages: u32) {
        self.num_pages = num_pages;
    }

    pub fn free_bytes(&self) -> u32 {
        self.free_bytes
    }

    pub fn set_free_bytes(&mut self, free_bytes: u32) {
        self.free_bytes = free_bytes;
    }

    pub fn freelist_entries(&self) -> usize {
        FREELIST_SLOTS
    }

    pub fn freelist_offset(&self, slot: usize) -> u32 {
        self.freelist[slot].offset
    }

    pub fn set_freelist_offset(&mut self, slot: usize, offset: u32) {
        self.freelist[slot].offset = offset;
    }

    pub fn freelist_size(&self, slot: usize) -> u32 {
        self.freelist[slot].size
    }

    pub fn set_freelist_size(&mut self, slot: usize, size: u32) {
        self.freelist[slot].size = size;
    }
}

/// Per-blob prefix stored in-line ahead of the payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct BlobHeader {
    self_id: u64,
    size: u64,
    alloc_size: u32,
    flags: u32,
}

impl BlobHeader {
    pub fn new(self_id: u64, size: u64, alloc_size: u32, flags: u32) -> Self {
        Self {
            self_id,
            size,
            alloc_size,
            flags,
        }
    }

    /// Copies a header out of a raw byte slice.
    pub fn read_from(data: &[u8]) -> Result<Self> {
        ensure!(
            data.len() >= size_of::<Self>(),
            "buffer too small for BlobHeader: {} < {}",
            data.len(),
            size_of::<Self>()
        );

        Self::read_from_bytes(&data[..size_of::<Self>()])
            .map_err(|e| eyre::eyre!("failed to read BlobHeader: {:?}", e))
    }

    pub fn self_id(&self) -> u64 {
        self.self_id
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn alloc_size(&self) -> u32 {
        self.alloc_size
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & BLOB_FLAG_COMPRESSED != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::IntoBytes;

    #[test]
    fn blob_header_is_24_bytes() {
        assert_eq!(BLOB_HEADER_SIZE, 24);
    }

    #[test]
    fn page_overhead_is_72_bytes() {
        assert_eq!(PAGE_OVERHEAD, 8 + FREELIST_SLOTS * 8);
    }

    #[test]
    fn blob_header_roundtrips_through_bytes() {
        let header = BlobHeader::new(16456, 1000, 1024, BLOB_FLAG_COMPRESSED);

        let decoded = BlobHeader::read_from(header.as_bytes()).unwrap();

        assert_eq!(decoded.self_id(), 16456);
        assert_eq!(decoded.size(), 1000);
        assert_eq!(decoded.alloc_size(), 1024);
        assert!(decoded.is_compressed());
    }

    #[test]
    fn blob_header_read_from_rejects_short_buffers() {
        assert!(BlobHeader::read_from(&[0u8; 16]).is_err());
    }

    // Stack stand-ins for page data; the header is parsed in place and
    // needs the alignment a real page buffer has.
    #[repr(align(8))]
    struct HeaderBytes([u8; PAGE_OVERHEAD]);

    #[test]
    fn page_header_accessors_roundtrip() {
        let mut data = HeaderBytes([0u8; PAGE_OVERHEAD]);
        let header = BlobPageHeader::from_bytes_mut(&mut data.0).unwrap();

        header.set_num_pages(3);
        header.set_free_bytes(12000);
        header.set_freelist_offset(2, 500);
        header.set_freelist_size(2, 128);

        let header = BlobPageHeader::from_bytes(&data.0).unwrap();
        assert_eq!(header.num_pages(), 3);
        assert_eq!(header.free_bytes(), 12000);
        assert_eq!(header.freelist_offset(2), 500);
        assert_eq!(header.freelist_size(2), 128);
        assert_eq!(header.freelist_entries(), FREELIST_SLOTS);
    }

    #[test]
    fn page_header_reset_clears_every_slot() {
        let mut data = HeaderBytes([0xFFu8; PAGE_OVERHEAD]);
        let header = BlobPageHeader::from_bytes_mut(&mut data.0).unwrap();

        header.reset();

        assert_eq!(header.num_pages(), 0);
        assert_eq!(header.free_bytes(), 0);
        for slot in 0..FREELIST_SLOTS {
            assert_eq!(header.freelist_offset(slot), 0);
            assert_eq!(header.freelist_size(slot), 0);
        }
    }

    #[test]
    fn headers_are_little_endian_on_disk() {
        let header = BlobHeader::new(0x0102030405060708, 0x11, 0x22, 0);
        let bytes = header.as_bytes();

        assert_eq!(bytes[0], 0x08);
        assert_eq!(bytes[7], 0x01);
        assert_eq!(bytes[8], 0x11);
        assert_eq!(bytes[16], 0x22);
    }
}
