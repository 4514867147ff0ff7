//! # Disk Blob Manager
//!
//! Multiplexes variable-sized blobs onto fixed-size pages. The manager
//! holds no persistent state of its own; everything lives in the page-run
//! headers it mutates through the page manager.
//!
//! ## Allocation
//!
//! ```text
//! record ──(optional compression)──> payload
//!    │
//!    ├─ fits a freelist gap on the last blob page? carve it out
//!    └─ else allocate a fresh contiguous run:
//!         num_pages = ceil((header + payload + overhead) / page_size)
//!    │
//!    └─ write BlobHeader + payload, chunked across the run's pages
//! ```
//!
//! Small blobs share single-page runs through a bounded per-page freelist
//! with coalescing. Blobs larger than a page get a dedicated run; the run's
//! freelist is unused, and when checksums are enabled slot 0's offset field
//! holds a MurmurHash3-x86-32 of the payload instead.
//!
//! ## Reads
//!
//! A read validates the header's self-id before trusting anything else.
//! Uncompressed blobs inside the mmap window are returned as zero-copy
//! borrows; everything else is copied (and decompressed) into the caller's
//! arena or buffer. Multi-page blobs re-verify the stored checksum on every
//! full read.
//!
//! ## Erase and Overwrite
//!
//! Erase returns a fully-empty run to the page manager; otherwise the
//! blob's footprint joins the freelist. Overwrite reuses the allocation in
//! place when the new payload fits (moving any tail to the freelist) and
//! otherwise degenerates to allocate-then-erase under a fresh id.

use std::sync::Arc;

use eyre::{bail, ensure, Result};
use log::trace;
use smallvec::SmallVec;
use zerocopy::IntoBytes;

use crate::compress::Compressor;
use crate::device::DiskDevice;
use crate::error::StoreError;
use crate::headers::{
    BlobHeader, BlobPageHeader, BLOB_FLAG_COMPRESSED, BLOB_HEADER_SIZE, FREELIST_SLOTS,
    PAGE_OVERHEAD,
};
use crate::page_manager::{FetchFlags, PageManager};
use crate::record::{ReadFlags, Record, WriteFlags};

/// Running totals of payload bytes seen before and after compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionMetrics {
    pub bytes_before: u64,
    pub bytes_after: u64,
}

/// Allocator, reader, writer, and eraser for on-disk blobs.
pub struct DiskBlobManager {
    device: Arc<DiskDevice>,
    metrics: CompressionMetrics,
}

impl DiskBlobManager {
    pub fn new(device: Arc<DiskDevice>) -> Self {
        Self {
            device,
            metrics: CompressionMetrics::default(),
        }
    }

    pub fn device(&self) -> &Arc<DiskDevice> {
        &self.device
    }

    pub fn metrics(&self) -> CompressionMetrics {
        self.metrics
    }

    /// Stores a record and returns its blob-id: the absolute file offset of
    /// the blob header, stable for the blob's lifetime.
    pub fn allocate<P: PageManager>(
        &mut self,
        pm: &mut P,
        record: &Record<'_>,
        flags: WriteFlags,
        compressor: Option<&mut dyn Compressor>,
    ) -> Result<u64> {
        let page_size = self.page_size();
        let original_size = record.size;
        let mut record_size = record.size;
        let mut payload: &[u8] = record.data;
        let mut compressed = false;

        // Partial writes never compress: the gaps would have to be
        // materialized first.
        if let Some(comp) = compressor {
            if !flags.disable_compression && !flags.partial {
                self.metrics.bytes_before += u64::from(record_size);
                let len = comp.compress(record.data)?;
                if (len as u32) < record_size {
                    record_size = len as u32;
                    compressed = true;
                    payload = comp.output();
                }
                self.metrics.bytes_after += u64::from(record_size);
            }
        }

        let alloc_size = BLOB_HEADER_SIZE as u32 + record_size;

        // First choice: a gap on the page the previous allocation used.
        let mut address = 0u64;
        let mut run_addr: Option<u64> = None;
        if let Some(last) = pm.last_blob_page() {
            let page = pm.fetch(last, FetchFlags::default())?;
            let page_addr = page.address();
            let header = BlobPageHeader::from_page_mut(page)?;
            if let Some(offset) = self.alloc_from_freelist(header, alloc_size)? {
                page.set_dirty(true);
                address = page_addr + u64::from(offset);
                run_addr = Some(page_addr);
            }
        }

        // Otherwise allocate a fresh run, long enough for the whole blob.
        let run_addr = match run_addr {
            Some(addr) => addr,
            None => {
                let required = alloc_size as u64 + PAGE_OVERHEAD as u64;
                let num_pages = required.div_ceil(u64::from(page_size)) as u32;

                let page = pm.alloc_blob_run(num_pages)?;
                let page_addr = page.address();
                let header = BlobPageHeader::from_page_mut(page)?;
                header.reset();
                header.set_num_pages(num_pages);
                header.set_free_bytes(num_pages * page_size - PAGE_OVERHEAD as u32);

                // Single-page runs keep the remainder as a freelist gap; a
                // multi-page run's slack past the blob is simply unused.
                if num_pages == 1 && header.free_bytes() > alloc_size {
                    header.set_freelist_offset(0, PAGE_OVERHEAD as u32 + alloc_size);
                    header.set_freelist_size(0, header.free_bytes() - alloc_size);
                }

                // Multi-page blobs store a payload checksum in slot 0, but
                // only when the payload is written in full.
                if num_pages > 1 && self.device.config().enable_checksums {
                    let checksum = if flags.partial {
                        0
                    } else {
                        payload_checksum(record.data)?
                    };
                    header.set_freelist_offset(0, checksum);
                }

                self.debug_check_integrity(header)?;
                page.set_dirty(true);
                address = page_addr + PAGE_OVERHEAD as u64;
                page_addr
            }
        };

        // Adjust the free-byte counter and the allocation hint.
        {
            let page = pm.fetch(run_addr, FetchFlags::default())?;
            let header = BlobPageHeader::from_page_mut(page)?;
            debug_assert!(header.free_bytes() >= alloc_size);
            header.set_free_bytes(header.free_bytes() - alloc_size);
            let remaining = header.free_bytes();
            page.set_dirty(true);
            pm.set_last_blob_page(if remaining > 0 { Some(run_addr) } else { None });
        }

        let blob_header = BlobHeader::new(
            address,
            u64::from(original_size),
            alloc_size,
            if compressed { BLOB_FLAG_COMPRESSED } else { 0 },
        );

        let mut write_addr = address;
        if flags.partial && record.partial_offset > 0 {
            // Leading gap: header, zero fill, then the written slice.
            self.write_chunks(pm, write_addr, &[blob_header.as_bytes()])?;
            write_addr += BLOB_HEADER_SIZE as u64;
            write_addr = self.write_zero_fill(pm, write_addr, record.partial_offset)?;
            self.write_chunks(pm, write_addr, &[record.data])?;
            write_addr += u64::from(record.partial_size);
        } else {
            let data_len = if flags.partial {
                record.partial_size as usize
            } else {
                payload.len()
            };
            self.write_chunks(pm, write_addr, &[blob_header.as_bytes(), &payload[..data_len]])?;
            write_addr += BLOB_HEADER_SIZE as u64 + data_len as u64;
        }

        // Trailing gap of a partial write.
        if flags.partial && record.partial_offset + record.partial_size < record.size {
            let gap = record.size - (record.partial_offset + record.partial_size);
            self.write_zero_fill(pm, write_addr, gap)?;
        }

        #[cfg(debug_assertions)]
        {
            let page = pm.fetch(run_addr, FetchFlags::default())?;
            let header = BlobPageHeader::from_page(page)?;
            ensure!(
                self.check_integrity(header)?,
                StoreError::IntegrityViolated
            );
        }

        Ok(address)
    }

    /// Reads a blob. Returns a zero-copy borrow of the mmap window when the
    /// blob is mapped, uncompressed, and a deep copy was not forced;
    /// otherwise the payload is copied into `arena` and borrowed from
    /// there.
    pub fn read<'s, P: PageManager>(
        &'s self,
        pm: &'s mut P,
        blob_id: u64,
        flags: ReadFlags,
        compressor: Option<&mut dyn Compressor>,
        arena: &'s mut Vec<u8>,
    ) -> Result<&'s [u8]> {
        let (header, run_addr) = self.read_header(pm, blob_id, true)?;
        if header.self_id() != blob_id {
            trace!(
                "blob {blob_id:#x} not found (header self-id {:#x})",
                header.self_id()
            );
            bail!(StoreError::BlobNotFound);
        }

        let blobsize = clamp_partial(header.size() as u32, flags.partial)?;
        if blobsize == 0 {
            return Ok(&[]);
        }

        let partial_offset = flags.partial.map_or(0, |(offset, _)| offset);
        let payload_addr = blob_id + BLOB_HEADER_SIZE as u64 + u64::from(partial_offset);

        let mapped = if !flags.force_deep_copy
            && !header.is_compressed()
            && self.device.is_mapped(blob_id, blobsize as usize)
        {
            self.device.mapped_slice(payload_addr, blobsize as usize)
        } else {
            None
        };

        let result: &[u8] = if let Some(slice) = mapped {
            slice
        } else if header.is_compressed() {
            let comp = compressor
                .ok_or_else(|| eyre::eyre!("blob {blob_id:#x} is compressed but no compressor was supplied"))?;

            // Stage the stored bytes in the compressor's arena, then
            // decompress into the caller's.
            let stored = header.alloc_size() as usize - BLOB_HEADER_SIZE;
            let mut staged = std::mem::take(comp.scratch());
            staged.resize(stored, 0);
            self.copy_chunk(pm, blob_id + BLOB_HEADER_SIZE as u64, &mut staged)?;

            arena.resize(blobsize as usize, 0);
            let outcome = comp.decompress(&staged, blobsize as usize, arena.as_mut_slice());
            *comp.scratch() = staged;
            outcome?;
            &arena[..]
        } else {
            arena.resize(blobsize as usize, 0);
            self.copy_chunk(pm, payload_addr, arena.as_mut_slice())?;
            &arena[..]
        };

        self.verify_checksum(pm, run_addr, flags, result)?;
        Ok(result)
    }

    /// Reads a blob into a caller-supplied buffer, always deep-copying.
    /// Returns the number of payload bytes written.
    pub fn read_into<P: PageManager>(
        &self,
        pm: &mut P,
        blob_id: u64,
        flags: ReadFlags,
        compressor: Option<&mut dyn Compressor>,
        buf: &mut [u8],
    ) -> Result<usize> {
        let (header, run_addr) = self.read_header(pm, blob_id, true)?;
        if header.self_id() != blob_id {
            bail!(StoreError::BlobNotFound);
        }

        let blobsize = clamp_partial(header.size() as u32, flags.partial)? as usize;
        if blobsize == 0 {
            return Ok(0);
        }
        ensure!(buf.len() >= blobsize, StoreError::InvalidParameter);

        let partial_offset = flags.partial.map_or(0, |(offset, _)| offset);

        if header.is_compressed() {
            let comp = compressor
                .ok_or_else(|| eyre::eyre!("blob {blob_id:#x} is compressed but no compressor was supplied"))?;

            let stored = header.alloc_size() as usize - BLOB_HEADER_SIZE;
            let mut staged = std::mem::take(comp.scratch());
            staged.resize(stored, 0);
            self.copy_chunk(pm, blob_id + BLOB_HEADER_SIZE as u64, &mut staged)?;

            let outcome = comp.decompress(&staged, blobsize, &mut buf[..blobsize]);
            *comp.scratch() = staged;
            outcome?;
        } else {
            let payload_addr = blob_id + BLOB_HEADER_SIZE as u64 + u64::from(partial_offset);
            self.copy_chunk(pm, payload_addr, &mut buf[..blobsize])?;
        }

        self.verify_checksum(pm, run_addr, flags, &buf[..blobsize])?;
        Ok(blobsize)
    }

    /// Logical size of a blob, without touching the payload.
    pub fn blob_size<P: PageManager>(&self, pm: &mut P, blob_id: u64) -> Result<u64> {
        let (header, _) = self.read_header(pm, blob_id, true)?;
        if header.self_id() != blob_id {
            bail!(StoreError::BlobNotFound);
        }
        Ok(header.size())
    }

    /// Overwrites a blob. Returns the same id when the new payload fits the
    /// old allocation; otherwise the blob moves and the new id is returned.
    ///
    /// In-place sizing uses the uncompressed length: a compressed payload
    /// almost never lands on the old size exactly, and when it does not
    /// fit, the reallocation path compresses it anyway.
    pub fn overwrite<P: PageManager>(
        &mut self,
        pm: &mut P,
        old_id: u64,
        record: &Record<'_>,
        flags: WriteFlags,
        compressor: Option<&mut dyn Compressor>,
    ) -> Result<u64> {
        let alloc_size = BLOB_HEADER_SIZE as u32 + record.size;

        let (old_header, run_addr) = self.read_header(pm, old_id, false)?;
        if old_header.self_id() != old_id {
            bail!(StoreError::BlobNotFound);
        }

        if alloc_size <= old_header.alloc_size() {
            // Compression stays off for in-place rewrites.
            let new_header = BlobHeader::new(old_id, u64::from(record.size), alloc_size, 0);

            if flags.partial && record.partial_offset > 0 {
                // The leading gap keeps whatever bytes were there before.
                self.write_chunks(pm, old_id, &[new_header.as_bytes()])?;
                let slice_addr = old_id
                    + BLOB_HEADER_SIZE as u64
                    + u64::from(record.partial_offset);
                self.write_chunks(pm, slice_addr, &[record.data])?;
            } else {
                let data_len = if flags.partial {
                    record.partial_size as usize
                } else {
                    record.data.len()
                };
                self.write_chunks(pm, old_id, &[new_header.as_bytes(), &record.data[..data_len]])?;
            }

            // The tail of the old allocation becomes a freelist gap.
            if alloc_size < old_header.alloc_size() {
                let tail = old_header.alloc_size() - alloc_size;
                let page = pm.fetch(run_addr, FetchFlags::default())?;
                let header = BlobPageHeader::from_page_mut(page)?;
                header.set_free_bytes(header.free_bytes() + tail);
                let offset = (old_id + u64::from(alloc_size) - run_addr) as u32;
                self.add_to_freelist(header, offset, tail)?;
                page.set_dirty(true);
            }

            // Refresh the multi-page checksum slot.
            if self.device.config().enable_checksums {
                let page = pm.fetch(run_addr, FetchFlags::default())?;
                let header = BlobPageHeader::from_page_mut(page)?;
                if header.num_pages() > 1 {
                    let checksum = if flags.partial {
                        0
                    } else {
                        payload_checksum(record.data)?
                    };
                    header.set_freelist_offset(0, checksum);
                    page.set_dirty(true);
                }
            }

            return Ok(old_id);
        }

        // Larger: overwrite becomes insert + delete under a fresh id.
        let new_id = self.allocate(pm, record, flags, compressor)?;
        self.erase(pm, old_id)?;
        Ok(new_id)
    }

    /// Erases a blob, returning its run to the page manager once the run is
    /// fully empty.
    pub fn erase<P: PageManager>(&mut self, pm: &mut P, blob_id: u64) -> Result<()> {
        let (header, run_addr) = self.read_header(pm, blob_id, false)?;
        if header.self_id() != blob_id {
            bail!(StoreError::BlobNotFound);
        }

        let page_size = self.page_size();
        let page = pm.fetch(run_addr, FetchFlags::default())?;
        let page_header = BlobPageHeader::from_page_mut(page)?;
        page_header.set_free_bytes(page_header.free_bytes() + header.alloc_size());

        let num_pages = page_header.num_pages();
        if page_header.free_bytes() == num_pages * page_size - PAGE_OVERHEAD as u32 {
            page_header.reset();
            page.set_dirty(true);
            pm.set_last_blob_page(None);
            pm.free_run(run_addr, num_pages)?;
            return Ok(());
        }

        self.add_to_freelist(page_header, (blob_id - run_addr) as u32, header.alloc_size())?;
        page.set_dirty(true);
        Ok(())
    }

    /// Carves `size` bytes out of a freelist gap. Returns the run-relative
    /// offset, or `None` when no gap fits. Multi-page runs never use the
    /// freelist.
    fn alloc_from_freelist(
        &self,
        header: &mut BlobPageHeader,
        size: u32,
    ) -> Result<Option<u32>> {
        self.debug_check_integrity(header)?;

        if header.num_pages() > 1 {
            return Ok(None);
        }

        // Exact fits first: a freed footprint is recycled whole before any
        // larger gap is nibbled.
        for slot in 0..header.freelist_entries() {
            if header.freelist_size(slot) == size {
                let offset = header.freelist_offset(slot);
                header.set_freelist_offset(slot, 0);
                header.set_freelist_size(slot, 0);
                self.debug_check_integrity(header)?;
                return Ok(Some(offset));
            }
        }

        // Otherwise shrink the first larger gap from the front.
        for slot in 0..header.freelist_entries() {
            let slot_size = header.freelist_size(slot);
            if slot_size > size {
                let offset = header.freelist_offset(slot);
                header.set_freelist_offset(slot, offset + size);
                header.set_freelist_size(slot, slot_size - size);
                self.debug_check_integrity(header)?;
                return Ok(Some(offset));
            }
        }

        Ok(None)
    }

    /// Records a freed region in the freelist: coalesces with an adjacent
    /// slot when possible, otherwise takes an empty slot, otherwise evicts
    /// the smallest slot if the new region is bigger. Gaps smaller than
    /// everything in a full table are leaked; the header stays fixed-size
    /// in exchange.
    fn add_to_freelist(&self, header: &mut BlobPageHeader, offset: u32, size: u32) -> Result<()> {
        self.debug_check_integrity(header)?;

        if header.num_pages() > 1 {
            return Ok(());
        }

        let count = header.freelist_entries();

        for slot in 0..count {
            if offset + size == header.freelist_offset(slot) {
                header.set_freelist_offset(slot, offset);
                header.set_freelist_size(slot, header.freelist_size(slot) + size);
                return self.debug_check_integrity(header);
            }
            if header.freelist_offset(slot) + header.freelist_size(slot) == offset {
                header.set_freelist_size(slot, header.freelist_size(slot) + size);
                return self.debug_check_integrity(header);
            }
        }

        let mut smallest = 0;
        for slot in 0..count {
            if header.freelist_size(slot) == 0 {
                header.set_freelist_offset(slot, offset);
                header.set_freelist_size(slot, size);
                return self.debug_check_integrity(header);
            }
            if header.freelist_size(slot) < header.freelist_size(smallest) {
                smallest = slot;
            }
        }

        if size > header.freelist_size(smallest) {
            header.set_freelist_offset(smallest, offset);
            header.set_freelist_size(smallest, size);
        }

        self.debug_check_integrity(header)
    }

    /// Validates a page-run header: the free-byte counter stays inside the
    /// run, and single-page freelists have no overlapping slots and stay
    /// inside the page. An overlap is hard corruption and fails with
    /// `IntegrityViolated`; the softer violations return `Ok(false)`.
    pub fn check_integrity(&self, header: &BlobPageHeader) -> Result<bool> {
        let page_size = self.page_size();
        debug_assert!(header.num_pages() > 0);

        if header.free_bytes() + PAGE_OVERHEAD as u32 > header.num_pages() * page_size {
            trace!("integrity violated: free bytes exceed the page run");
            return Ok(false);
        }

        if header.num_pages() > 1 {
            return Ok(true);
        }

        let count = header.freelist_entries();
        if count == 0 {
            return Ok(true);
        }

        let mut total = 0u32;
        let mut ranges: SmallVec<[(u32, u32); FREELIST_SLOTS]> = SmallVec::new();
        for slot in 0..count - 1 {
            if header.freelist_size(slot) == 0 {
                continue;
            }
            total += header.freelist_size(slot);
            ranges.push((header.freelist_offset(slot), header.freelist_size(slot)));
        }

        if total > header.free_bytes() {
            trace!("integrity violated: freelist slots exceed the free bytes");
            return Ok(false);
        }

        ranges.sort_unstable();

        for i in 0..ranges.len().saturating_sub(1) {
            let (offset, size) = ranges[i];
            if offset + size > header.num_pages() * page_size {
                trace!("integrity violated: freelist slot {offset}+{size} exceeds the page");
                return Ok(false);
            }
            if offset + size > ranges[i + 1].0 {
                trace!(
                    "integrity violated: freelist slot {offset}+{size} overlaps slot at {}",
                    ranges[i + 1].0
                );
                bail!(StoreError::IntegrityViolated);
            }
        }

        Ok(true)
    }

    fn debug_check_integrity(&self, header: &BlobPageHeader) -> Result<()> {
        if cfg!(debug_assertions) {
            ensure!(
                self.check_integrity(header)?,
                StoreError::IntegrityViolated
            );
        }
        Ok(())
    }

    /// Copies `chunks` to `address`, walking page by page and marking every
    /// touched page dirty.
    fn write_chunks<P: PageManager>(
        &self,
        pm: &mut P,
        mut address: u64,
        chunks: &[&[u8]],
    ) -> Result<()> {
        let page_size = u64::from(self.page_size());

        for chunk in chunks {
            let mut data: &[u8] = chunk;
            while !data.is_empty() {
                let page_addr = address - address % page_size;
                let page = pm.fetch(page_addr, FetchFlags::no_header())?;
                let start = (address - page_addr) as usize;
                let len = data.len().min(page_size as usize - start);
                page.data_mut()[start..start + len].copy_from_slice(&data[..len]);
                page.set_dirty(true);
                address += len as u64;
                data = &data[len..];
            }
        }
        Ok(())
    }

    /// Zero-fills `gap` bytes at `address` in page-sized chunks. Returns
    /// the address past the fill.
    fn write_zero_fill<P: PageManager>(
        &self,
        pm: &mut P,
        mut address: u64,
        mut gap: u32,
    ) -> Result<u64> {
        let page_size = self.page_size();
        let zeroes = vec![0u8; gap.min(page_size) as usize];

        while gap > 0 {
            let len = gap.min(page_size);
            self.write_chunks(pm, address, &[&zeroes[..len as usize]])?;
            address += u64::from(len);
            gap -= len;
        }
        Ok(address)
    }

    /// Copies payload bytes at `address` into `out`, page by page.
    fn copy_chunk<P: PageManager>(&self, pm: &mut P, mut address: u64, out: &mut [u8]) -> Result<()> {
        let page_size = u64::from(self.page_size());
        let mut done = 0usize;
        let mut first = true;

        while done < out.len() {
            let page_addr = address - address % page_size;
            let flags = FetchFlags {
                read_only: true,
                no_header: !first,
            };
            let page = pm.fetch(page_addr, flags)?;
            let start = (address - page_addr) as usize;
            let len = (out.len() - done).min(page_size as usize - start);
            out[done..done + len].copy_from_slice(&page.data()[start..start + len]);
            address += len as u64;
            done += len;
            first = false;
        }
        Ok(())
    }

    /// Copies the blob header at `blob_id` out of its page. Returns the
    /// header and the address of the run's first page.
    fn read_header<P: PageManager>(
        &self,
        pm: &mut P,
        blob_id: u64,
        read_only: bool,
    ) -> Result<(BlobHeader, u64)> {
        let page_size = u64::from(self.page_size());
        let page_addr = blob_id - blob_id % page_size;
        let flags = FetchFlags {
            read_only,
            ..FetchFlags::default()
        };
        let page = pm.fetch(page_addr, flags)?;
        let start = (blob_id - page_addr) as usize;
        let header = BlobHeader::read_from(&page.data()[start..])?;
        Ok((header, page_addr))
    }

    /// Re-verifies the stored payload checksum of a multi-page blob on a
    /// full (non-partial) read.
    fn verify_checksum<P: PageManager>(
        &self,
        pm: &mut P,
        run_addr: u64,
        flags: ReadFlags,
        payload: &[u8],
    ) -> Result<()> {
        if flags.partial.is_some() || !self.device.config().enable_checksums {
            return Ok(());
        }

        let page = pm.fetch(run_addr, FetchFlags::read_only())?;
        let header = BlobPageHeader::from_page(page)?;
        if header.num_pages() <= 1 {
            return Ok(());
        }

        let stored = header.freelist_offset(0);
        let actual = payload_checksum(payload)?;
        if stored != actual {
            trace!("checksum mismatch in run {run_addr:#x}: {stored:#x} != {actual:#x}");
            bail!(StoreError::IntegrityViolated);
        }
        Ok(())
    }

    fn page_size(&self) -> u32 {
        self.device.config().page_size_bytes
    }
}

/// MurmurHash3-x86-32 over the payload, seed 0. The algorithm is part of
/// the on-disk format.
fn payload_checksum(data: &[u8]) -> Result<u32> {
    Ok(murmur3::murmur3_32(&mut std::io::Cursor::new(data), 0)?)
}

fn clamp_partial(full_size: u32, partial: Option<(u32, u32)>) -> Result<u32> {
    match partial {
        Some((offset, len)) => {
            if offset > full_size {
                trace!("partial offset {offset} is past the end of the blob ({full_size})");
                bail!(StoreError::InvalidParameter);
            }
            Ok(len.min(full_size - offset))
        }
        None => Ok(full_size),
    }
}
