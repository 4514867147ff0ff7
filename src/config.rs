//! # Store Configuration
//!
//! Runtime configuration for a LodeDB blob store. A `StoreConfig` is built
//! once, handed to the device at construction, and shared read-only by every
//! layer above it. Interdependent values are documented here so they cannot
//! drift apart:
//!
//! ```text
//! page_size_bytes (default 16384)
//!       │
//!       ├─> PAGE_OVERHEAD (headers::PAGE_OVERHEAD, fixed 72 bytes)
//!       │     Usable payload of a run = num_pages * page_size - PAGE_OVERHEAD.
//!       │     page_size_bytes must exceed PAGE_OVERHEAD + BLOB_HEADER_SIZE
//!       │     or no blob fits on a fresh page.
//!       │
//!       └─> Encryption requires full-page writes, so a cipher forces the
//!           pread/pwrite path (mmap is skipped at open).
//!
//! file_size_limit_bytes (default unlimited)
//!       │
//!       └─> Every truncate is checked against this limit; exceeding it
//!           fails with StoreError::LimitsReached.
//! ```
//!
//! ## Thread Safety
//!
//! `StoreConfig` is immutable after construction and `Clone`; the cipher hook
//! is shared behind an `Arc`.

use std::sync::Arc;

use crate::device::PageCipher;

/// Default page size. Larger than the common 4KB OS page for better
/// sequential throughput; always a multiple of the mmap granularity.
pub const DEFAULT_PAGE_SIZE: u32 = 16384;

/// POSIX file access advice applied at create/open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PosixAdvice {
    #[default]
    Normal,
    Random,
    Sequential,
}

/// Configuration shared by the device, page manager, and blob manager.
#[derive(Clone)]
pub struct StoreConfig {
    /// Size of every page in the file. Fixed for the lifetime of a store.
    pub page_size_bytes: u32,
    /// Hard ceiling on the file size; truncates past it fail.
    pub file_size_limit_bytes: u64,
    /// Store and verify per-blob checksums for multi-page blobs.
    pub enable_checksums: bool,
    /// Never establish an mmap window; all I/O goes through pread/pwrite.
    pub disable_mmap: bool,
    /// Open the file read-only. Writes and allocations will fail at the
    /// file level.
    pub read_only: bool,
    /// Unix permission bits for newly created files.
    pub file_mode: u32,
    /// Access-pattern advice passed to the kernel on create/open.
    pub posix_advice: PosixAdvice,
    /// Optional page cipher. Enabling one forbids sub-page writes and
    /// disables the mmap window.
    pub cipher: Option<Arc<dyn PageCipher>>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size_bytes: DEFAULT_PAGE_SIZE,
            file_size_limit_bytes: u64::MAX,
            enable_checksums: false,
            disable_mmap: false,
            read_only: false,
            file_mode: 0o644,
            posix_advice: PosixAdvice::Normal,
            cipher: None,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("page_size_bytes", &self.page_size_bytes)
            .field("file_size_limit_bytes", &self.file_size_limit_bytes)
            .field("enable_checksums", &self.enable_checksums)
            .field("disable_mmap", &self.disable_mmap)
            .field("read_only", &self.read_only)
            .field("file_mode", &format_args!("{:o}", self.file_mode))
            .field("posix_advice", &self.posix_advice)
            .field("cipher", &self.cipher.is_some())
            .finish()
    }
}

impl StoreConfig {
    /// True if page I/O must be encrypted/decrypted through the cipher hook.
    pub fn is_encryption_enabled(&self) -> bool {
        self.cipher.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_16k_pages() {
        let config = StoreConfig::default();

        assert_eq!(config.page_size_bytes, DEFAULT_PAGE_SIZE);
        assert_eq!(config.file_size_limit_bytes, u64::MAX);
        assert!(!config.enable_checksums);
        assert!(!config.is_encryption_enabled());
    }

    #[test]
    fn debug_output_does_not_expose_cipher_internals() {
        let config = StoreConfig::default();
        let rendered = format!("{:?}", config);

        assert!(rendered.contains("cipher: false"));
    }
}
