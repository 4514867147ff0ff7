//! # Record Inputs and Read Flags
//!
//! The write side of the blob manager takes a `Record`: the payload bytes
//! plus an optional partial-write slice. For a partial write, `data` holds
//! only the written slice while `size` is the full logical length of the
//! blob; the gaps before and after the slice are zero-filled on disk.
//!
//! The read side takes `ReadFlags` selecting a partial span and whether a
//! deep copy is forced even when the blob could be served straight out of
//! the mmap window.

/// A user record handed to `allocate` or `overwrite`.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Payload bytes: the whole blob, or just the written slice for a
    /// partial write.
    pub data: &'a [u8],
    /// Logical blob size.
    pub size: u32,
    /// Start of the written slice within the blob (partial writes only).
    pub partial_offset: u32,
    /// Length of the written slice (partial writes only).
    pub partial_size: u32,
}

impl<'a> Record<'a> {
    /// A full record; the logical size is the payload length.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            size: data.len() as u32,
            partial_offset: 0,
            partial_size: 0,
        }
    }

    /// A partial record: `data` is written at `offset` inside a blob of
    /// `total_size` logical bytes. Pair with `WriteFlags { partial: true }`.
    pub fn partial(data: &'a [u8], total_size: u32, offset: u32) -> Self {
        Self {
            data,
            size: total_size,
            partial_offset: offset,
            partial_size: data.len() as u32,
        }
    }
}

/// Flags for `allocate` and `overwrite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteFlags {
    /// Only the record's partial slice is written; gaps are zero-filled.
    pub partial: bool,
    /// Skip the compressor even if one is supplied.
    pub disable_compression: bool,
}

/// Flags for `read` and `read_into`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadFlags {
    /// Read only `(offset, len)` of the payload.
    pub partial: Option<(u32, u32)>,
    /// Always copy, even when the blob is mapped and uncompressed.
    pub force_deep_copy: bool,
}
