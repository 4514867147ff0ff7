//! # Page Buffers
//!
//! A `Page` is a fixed-size buffer tagged with the file address it backs.
//! The buffer is either an exclusive heap allocation or a borrow into the
//! device's mmap window; the tagged `PageBuffer` variant makes the ownership
//! difference explicit so releasing a mapped buffer is a no-op.
//!
//! ## Buffer States
//!
//! ```text
//! PageBuffer::None     no storage attached (fresh Page, or after free)
//! PageBuffer::Owned    heap allocation, released by free_buffer()/Drop
//! PageBuffer::Mapped   borrow into the device mmap window, never released
//! ```
//!
//! ## Safety Model
//!
//! The `Mapped` variant stores a raw pointer into the device's mmap window.
//! The window is established once at open time and stays at a fixed address
//! until the device is closed or dropped; the page cache that owns every
//! `Page` also owns a handle to the device, so mapped buffers cannot outlive
//! the mapping. `Page` is deliberately not `Send`/`Sync` — pages live inside
//! the single-threaded page cache.
//!
//! A mapped buffer created from a read-only window must never be written;
//! `data_mut` asserts this in debug builds.

use std::ptr::NonNull;

enum PageBuffer {
    None,
    Owned(Box<[u8]>),
    Mapped {
        ptr: NonNull<u8>,
        len: usize,
        writable: bool,
    },
}

/// A fixed-size file-backed buffer with a dirty flag.
pub struct Page {
    address: u64,
    dirty: bool,
    without_header: bool,
    buf: PageBuffer,
}

impl Page {
    /// Creates a page with no attached buffer.
    pub fn new(address: u64) -> Self {
        Self {
            address,
            dirty: false,
            without_header: false,
            buf: PageBuffer::None,
        }
    }

    /// File offset this page backs; always page-aligned.
    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn set_address(&mut self, address: u64) {
        self.address = address;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Continuation pages of a multi-page run carry no page header.
    pub fn is_without_header(&self) -> bool {
        self.without_header
    }

    pub fn set_without_header(&mut self, without_header: bool) {
        self.without_header = without_header;
    }

    pub fn has_buffer(&self) -> bool {
        !matches!(self.buf, PageBuffer::None)
    }

    /// True if the buffer is a borrow into the device mmap window.
    pub fn is_mapped(&self) -> bool {
        matches!(self.buf, PageBuffer::Mapped { .. })
    }

    /// Attaches an exclusive heap buffer, replacing any previous buffer.
    pub fn assign_owned_buffer(&mut self, buf: Box<[u8]>, address: u64) {
        self.buf = PageBuffer::Owned(buf);
        self.address = address;
    }

    /// Attaches a borrow into the device mmap window.
    ///
    /// # Safety
    ///
    /// `ptr` must point at `len` bytes inside a mapping that stays valid and
    /// at a fixed address for as long as this buffer is attached. If
    /// `writable` is set, the mapping must be writable and `ptr..ptr+len`
    /// must not alias any other live Rust reference.
    pub unsafe fn assign_mapped_buffer(
        &mut self,
        ptr: NonNull<u8>,
        len: usize,
        writable: bool,
        address: u64,
    ) {
        self.buf = PageBuffer::Mapped { ptr, len, writable };
        self.address = address;
    }

    /// Releases the buffer. Heap storage is freed; mapped borrows are
    /// simply detached.
    pub fn free_buffer(&mut self) {
        self.buf = PageBuffer::None;
    }

    /// The raw page bytes.
    ///
    /// Panics if no buffer is attached; the device attaches a buffer before
    /// any caller can observe the page.
    pub fn data(&self) -> &[u8] {
        match &self.buf {
            PageBuffer::Owned(buf) => buf,
            // SAFETY: upheld by the assign_mapped_buffer contract; the
            // mapping outlives the page and the returned borrow is tied
            // to &self.
            PageBuffer::Mapped { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
            PageBuffer::None => panic!("page {:#x} has no buffer attached", self.address),
        }
    }

    /// Mutable access to the raw page bytes.
    ///
    /// Panics if no buffer is attached. Mapped buffers from a read-only
    /// window are rejected in debug builds.
    pub fn data_mut(&mut self) -> &mut [u8] {
        match &mut self.buf {
            PageBuffer::Owned(buf) => buf,
            PageBuffer::Mapped { ptr, len, writable } => {
                debug_assert!(*writable, "write into read-only mapped page");
                // SAFETY: upheld by the assign_mapped_buffer contract; the
                // &mut self borrow makes this the only Rust reference into
                // the region obtained through this page.
                unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), *len) }
            }
            PageBuffer::None => panic!("page {:#x} has no buffer attached", self.address),
        }
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.buf {
            PageBuffer::None => "none",
            PageBuffer::Owned(_) => "owned",
            PageBuffer::Mapped { .. } => "mapped",
        };
        f.debug_struct("Page")
            .field("address", &self.address)
            .field("dirty", &self.dirty)
            .field("without_header", &self.without_header)
            .field("buffer", &kind)
            .finish()
    }
}
