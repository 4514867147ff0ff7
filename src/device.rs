//! # Disk Device
//!
//! File-backed byte store underneath the page and blob layers. The device
//! arbitrates between two I/O paths:
//!
//! - **mmap window**: established once at open time over the whole file,
//!   when the file size is a non-zero multiple of the OS mapping
//!   granularity. Pages inside the window are handed out as zero-copy
//!   borrows.
//! - **pread/pwrite**: everything else, including all writes and every page
//!   past the window.
//!
//! ## End-of-File Excess
//!
//! Growing a file one page at a time causes a truncate syscall per
//! allocation, which shows up as latency spikes. `alloc` therefore grows the
//! file past the requested length and carves subsequent allocations out of
//! the reserved tail. The reserve scales with the current file size and is
//! reclaimable with `reclaim_space`.
//!
//! ## Safety Model
//!
//! The mmap window lives at a fixed address from `open` until `close` or
//! drop; it is never remapped in between. Operations that replace the window
//! (`create`, `open`, `close`) take `&mut self`, so the borrow checker
//! rejects any zero-copy borrow (`mapped_slice`, mapped page buffers held by
//! a cache that owns a device handle) outliving the mapping.
//!
//! Writes go through pwrite even for mapped regions. The kernel keeps the
//! mapping coherent on the supported platforms, but callers must not rely on
//! a write becoming visible through an outstanding mapped borrow; the
//! environment serializes writers against zero-copy readers.
//!
//! ## Thread Safety
//!
//! A single `parking_lot::Mutex` (spins briefly before parking) guards all
//! mutable state; it is held for the duration of each I/O syscall and is not
//! reentrant.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::ptr::NonNull;

use eyre::{bail, ensure, Result, WrapErr};
use log::warn;
use memmap2::{Mmap, MmapMut};
use parking_lot::Mutex;

use crate::config::{PosixAdvice, StoreConfig};
use crate::error::StoreError;
use crate::page::Page;

/// Hook for transparent page encryption. Implementations derive a nonce or
/// tweak from the file offset so identical plaintext pages do not produce
/// identical ciphertext.
pub trait PageCipher: Send + Sync {
    /// Encrypts `plain` into `out`; both slices have the same length.
    fn encrypt(&self, offset: u64, plain: &[u8], out: &mut [u8]);

    /// Decrypts `data` in place.
    fn decrypt(&self, offset: u64, data: &mut [u8]);
}

enum MapWindow {
    None,
    ReadWrite(MmapMut),
    ReadOnly(Mmap),
}

struct DeviceState {
    file: Option<File>,
    window: MapWindow,
    // byte length covered by the window; 0 when unmapped
    mapped_size: u64,
    // cached file length, kept in sync with every truncate
    file_size: u64,
    // reserved capacity past the logical end of the file
    excess_at_end: u64,
}

/// A file-backed device with an optional mmap window and an end-of-file
/// excess reserve.
pub struct DiskDevice {
    config: StoreConfig,
    state: Mutex<DeviceState>,
}

impl DiskDevice {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            state: Mutex::new(DeviceState {
                file: None,
                window: MapWindow::None,
                mapped_size: 0,
                file_size: 0,
                excess_at_end: 0,
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Creates a new file, replacing any existing one. The device starts
    /// with size 0 and no mmap window.
    pub fn create<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.config.file_mode);
        }
        let file = options
            .open(path)
            .wrap_err_with(|| format!("failed to create store file '{}'", path.display()))?;

        apply_posix_advice(&file, self.config.posix_advice);

        let state = self.state.get_mut();
        state.file = Some(file);
        state.window = MapWindow::None;
        state.mapped_size = 0;
        state.file_size = 0;
        state.excess_at_end = 0;
        Ok(())
    }

    /// Opens an existing file and tries to map it. A map failure is not
    /// fatal: the device logs it and falls back to pread/pwrite.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let read_only = self.config.read_only;

        let file = OpenOptions::new()
            .read(true)
            .write(!read_only)
            .open(path)
            .wrap_err_with(|| format!("failed to open store file '{}'", path.display()))?;

        apply_posix_advice(&file, self.config.posix_advice);

        let file_size = file
            .metadata()
            .wrap_err_with(|| format!("failed to stat '{}'", path.display()))?
            .len();

        let mut window = MapWindow::None;
        let mut mapped_size = 0;

        // Encryption operates on full pages through pread/pwrite only. A
        // mapping also must not extend past the real end of the file;
        // accessing the tail of a short final granule faults on some
        // platforms.
        let can_map = !self.config.disable_mmap
            && self.config.cipher.is_none()
            && file_size != 0
            && file_size % map_granularity() == 0;

        if can_map {
            if read_only {
                // SAFETY: the mapping is over a file this process opened; the
                // window lives inside DeviceState and is dropped before the
                // file handle. External truncation of a store file in use is
                // outside the supported model.
                match unsafe { Mmap::map(&file) } {
                    Ok(map) => {
                        mapped_size = file_size;
                        window = MapWindow::ReadOnly(map);
                    }
                    Err(err) => {
                        warn!(
                            "mmap of '{}' failed ({err}), falling back to pread",
                            path.display()
                        );
                    }
                }
            } else {
                // SAFETY: as above; all writes go through pwrite or through
                // page buffers handed out one at a time by read_page.
                match unsafe { MmapMut::map_mut(&file) } {
                    Ok(map) => {
                        mapped_size = file_size;
                        window = MapWindow::ReadWrite(map);
                    }
                    Err(err) => {
                        warn!(
                            "mmap of '{}' failed ({err}), falling back to pread/pwrite",
                            path.display()
                        );
                    }
                }
            }
        }

        let state = self.state.get_mut();
        state.file = Some(file);
        state.window = window;
        state.mapped_size = mapped_size;
        state.file_size = file_size;
        state.excess_at_end = 0;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().file.is_some()
    }

    /// Unmaps and closes the file. Idempotent.
    pub fn close(&mut self) {
        let state = self.state.get_mut();
        state.window = MapWindow::None;
        state.mapped_size = 0;
        state.file = None;
    }

    /// Durably flushes the file.
    pub fn flush(&self) -> Result<()> {
        let state = self.state.lock();
        let file = open_file(&state)?;
        file.sync_all().wrap_err("fsync failed")
    }

    /// Resizes the file. Fails with `LimitsReached` past the configured
    /// file size limit.
    pub fn truncate(&self, new_size: u64) -> Result<()> {
        let mut state = self.state.lock();
        self.truncate_locked(&mut state, new_size)
    }

    /// Cached file length.
    pub fn file_size(&self) -> u64 {
        let state = self.state.lock();
        debug_assert_eq!(
            state.file_size,
            state
                .file
                .as_ref()
                .and_then(|f| f.metadata().ok())
                .map(|m| m.len())
                .unwrap_or(state.file_size),
        );
        state.file_size
    }

    /// Reads `buf.len()` bytes at `offset`, bypassing the mmap window.
    /// Decrypts in place when a cipher is configured.
    pub fn read(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let state = self.state.lock();
        let file = open_file(&state)?;
        pread_exact(file, offset, buf)
            .wrap_err_with(|| format!("pread of {} bytes at offset {offset} failed", buf.len()))?;
        if let Some(cipher) = &self.config.cipher {
            cipher.decrypt(offset, buf);
        }
        Ok(())
    }

    /// Writes `data` at `offset` through pwrite. With a cipher configured,
    /// only page-aligned full-page writes are allowed; the data is
    /// encrypted into a scratch buffer first.
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        let state = self.state.lock();
        let file = open_file(&state)?;
        if let Some(cipher) = &self.config.cipher {
            ensure!(
                !data.is_empty() && offset % data.len() as u64 == 0,
                "encrypted writes must cover whole pages (offset {offset}, len {})",
                data.len()
            );
            let mut scratch = vec![0u8; data.len()];
            cipher.encrypt(offset, data, &mut scratch);
            return pwrite_all(file, offset, &scratch)
                .wrap_err_with(|| format!("pwrite of {} bytes at offset {offset} failed", data.len()));
        }
        pwrite_all(file, offset, data)
            .wrap_err_with(|| format!("pwrite of {} bytes at offset {offset} failed", data.len()))
    }

    /// Bump-allocates `size` bytes at the end of the file.
    ///
    /// Carves from the excess reserve when possible; otherwise grows the
    /// file by `size` plus a new reserve that scales with the current file
    /// size, so truncate syscalls stay rare as the store grows.
    pub fn alloc(&self, size: u64) -> Result<u64> {
        let mut state = self.state.lock();

        if state.excess_at_end >= size {
            let address = state.file_size - state.excess_at_end;
            state.excess_at_end -= size;
            return Ok(address);
        }

        // Truncating a mapped file is not allowed on win32.
        #[cfg(windows)]
        let allocate_excess = state.mapped_size == 0;
        #[cfg(not(windows))]
        let allocate_excess = true;

        let excess = if allocate_excess {
            if state.file_size < size * 100 {
                0
            } else if state.file_size < size * 250 {
                size * 100
            } else if state.file_size < size * 1000 {
                size * 250
            } else {
                size * 1000
            }
        } else {
            0
        };

        let address = state.file_size;
        self.truncate_locked(&mut state, address + size + excess)?;
        state.excess_at_end = excess;
        Ok(address)
    }

    /// Fetches the page at `address`. Inside the mmap window the page
    /// becomes a zero-copy borrow; outside it a heap buffer is filled via
    /// pread (decrypting if configured).
    pub fn read_page(&self, page: &mut Page, address: u64) -> Result<()> {
        let page_size = self.config.page_size_bytes as usize;
        let mut state = self.state.lock();

        if address + page_size as u64 <= state.mapped_size {
            let (base, writable) = match &mut state.window {
                MapWindow::ReadWrite(map) => (map.as_mut_ptr(), true),
                MapWindow::ReadOnly(map) => (map.as_ptr() as *mut u8, false),
                MapWindow::None => unreachable!("mapped_size is 0 while unmapped"),
            };
            page.free_buffer();
            // SAFETY: address + page_size lies inside the window, the window
            // stays at a fixed address until close(&mut self), and the page
            // lives in a cache that holds a device handle. A read-only
            // window is tagged so the page rejects mutable access.
            unsafe {
                let ptr = NonNull::new_unchecked(base.add(address as usize));
                page.assign_mapped_buffer(ptr, page_size, writable, address);
            }
            return Ok(());
        }

        if !page.has_buffer() || page.is_mapped() {
            page.assign_owned_buffer(vec![0u8; page_size].into_boxed_slice(), address);
        } else {
            page.set_address(address);
        }

        let file = open_file(&state)?;
        pread_exact(file, address, page.data_mut())
            .wrap_err_with(|| format!("pread of page at offset {address} failed"))?;
        if let Some(cipher) = &self.config.cipher {
            cipher.decrypt(address, page.data_mut());
        }
        Ok(())
    }

    /// Allocates file space for one page and attaches a fresh heap buffer.
    /// Never hands out mapped memory: a newly allocated page may still be
    /// truncated away before it is ever flushed.
    pub fn alloc_page(&self, page: &mut Page) -> Result<()> {
        let page_size = self.config.page_size_bytes;
        let address = self.alloc(page_size as u64)?;
        page.assign_owned_buffer(vec![0u8; page_size as usize].into_boxed_slice(), address);
        Ok(())
    }

    /// Releases a page buffer; counterpoint to `alloc_page`. The file space
    /// itself is reclaimed by the page manager, not the device.
    pub fn free_page(&self, page: &mut Page) {
        debug_assert!(page.has_buffer());
        page.free_buffer();
    }

    /// True if `offset..offset + len` lies entirely inside the mmap window.
    pub fn is_mapped(&self, offset: u64, len: usize) -> bool {
        offset + len as u64 <= self.state.lock().mapped_size
    }

    /// Zero-copy view of a mapped file region. Returns `None` when any part
    /// of the region lies outside the window.
    ///
    /// The borrow is tied to `&self`; the window cannot be replaced while it
    /// is live because `create`/`open`/`close` take `&mut self`.
    pub fn mapped_slice(&self, offset: u64, len: usize) -> Option<&[u8]> {
        let state = self.state.lock();
        if len == 0 || offset + len as u64 > state.mapped_size {
            return None;
        }
        let base = match &state.window {
            MapWindow::ReadWrite(map) => map.as_ptr(),
            MapWindow::ReadOnly(map) => map.as_ptr(),
            MapWindow::None => return None,
        };
        // SAFETY: the region is inside the window, and the window outlives
        // the returned borrow (see the struct-level safety model).
        Some(unsafe { std::slice::from_raw_parts(base.add(offset as usize), len) })
    }

    /// Gives the excess reserve back to the filesystem.
    pub fn reclaim_space(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.excess_at_end > 0 {
            let new_size = state.file_size - state.excess_at_end;
            self.truncate_locked(&mut state, new_size)?;
            state.excess_at_end = 0;
        }
        Ok(())
    }

    fn truncate_locked(&self, state: &mut DeviceState, new_size: u64) -> Result<()> {
        if new_size > self.config.file_size_limit_bytes {
            bail!(StoreError::LimitsReached);
        }
        let file = open_file(state)?;
        file.set_len(new_size)
            .wrap_err_with(|| format!("truncate to {new_size} bytes failed"))?;
        state.file_size = new_size;
        Ok(())
    }
}

fn open_file(state: &DeviceState) -> Result<&File> {
    state
        .file
        .as_ref()
        .ok_or_else(|| eyre::eyre!("device is not open"))
}

#[cfg(unix)]
fn pread_exact(file: &File, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(unix)]
fn pwrite_all(file: &File, offset: u64, data: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(data, offset)
}

#[cfg(windows)]
fn pread_exact(file: &File, mut offset: u64, mut buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        let n = file.seek_read(buf, offset)?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        offset += n as u64;
        buf = &mut buf[n..];
    }
    Ok(())
}

#[cfg(windows)]
fn pwrite_all(file: &File, mut offset: u64, mut data: &[u8]) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !data.is_empty() {
        let n = file.seek_write(data, offset)?;
        offset += n as u64;
        data = &data[n..];
    }
    Ok(())
}

/// Smallest file size unit the OS will map.
fn map_granularity() -> u64 {
    #[cfg(unix)]
    // SAFETY: sysconf with a valid name has no preconditions.
    unsafe {
        libc::sysconf(libc::_SC_PAGESIZE) as u64
    }
    #[cfg(not(unix))]
    {
        // Windows allocation granularity.
        65536
    }
}

#[cfg(unix)]
fn apply_posix_advice(file: &File, advice: PosixAdvice) {
    use std::os::unix::io::AsRawFd;

    let advice = match advice {
        PosixAdvice::Normal => return,
        PosixAdvice::Random => libc::POSIX_FADV_RANDOM,
        PosixAdvice::Sequential => libc::POSIX_FADV_SEQUENTIAL,
    };
    // SAFETY: fadvise is a hint; it cannot invalidate memory and a failure
    // is ignorable.
    unsafe {
        libc::posix_fadvise(file.as_raw_fd(), 0, 0, advice);
    }
}

#[cfg(not(unix))]
fn apply_posix_advice(_file: &File, _advice: PosixAdvice) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::store_error;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn test_config() -> StoreConfig {
        StoreConfig {
            page_size_bytes: 4096,
            ..StoreConfig::default()
        }
    }

    fn created_device(dir: &tempfile::TempDir) -> DiskDevice {
        let mut device = DiskDevice::new(test_config());
        device.create(dir.path().join("store.lode")).unwrap();
        device
    }

    #[test]
    fn create_starts_empty_and_unmapped() {
        let dir = tempdir().unwrap();
        let device = created_device(&dir);

        assert!(device.is_open());
        assert_eq!(device.file_size(), 0);
        assert!(!device.is_mapped(0, 1));
    }

    #[test]
    fn close_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut device = created_device(&dir);

        device.close();
        device.close();

        assert!(!device.is_open());
    }

    #[test]
    fn read_write_roundtrip_through_pwrite() {
        let dir = tempdir().unwrap();
        let device = created_device(&dir);
        device.truncate(8192).unwrap();

        device.write(100, b"hello blob device").unwrap();

        let mut buf = [0u8; 17];
        device.read(100, &mut buf).unwrap();
        assert_eq!(&buf, b"hello blob device");
    }

    #[test]
    fn truncate_past_limit_fails_with_limits_reached() {
        let dir = tempdir().unwrap();
        let mut device = DiskDevice::new(StoreConfig {
            page_size_bytes: 4096,
            file_size_limit_bytes: 16384,
            ..StoreConfig::default()
        });
        device.create(dir.path().join("store.lode")).unwrap();

        let err = device.truncate(16385).unwrap_err();

        assert_eq!(store_error(&err), Some(StoreError::LimitsReached));
        assert_eq!(device.file_size(), 0);
    }

    #[test]
    fn alloc_small_file_reserves_no_excess() {
        let dir = tempdir().unwrap();
        let device = created_device(&dir);

        let addr = device.alloc(4096).unwrap();

        assert_eq!(addr, 0);
        assert_eq!(device.file_size(), 4096);
    }

    #[test]
    fn alloc_carves_from_excess_before_growing() {
        let dir = tempdir().unwrap();
        let device = created_device(&dir);

        // Push the file past 100 allocation units so the next growth
        // reserves a 100x excess tail.
        device.truncate(4096 * 128).unwrap();
        let first = device.alloc(4096).unwrap();
        assert_eq!(first, 4096 * 128);
        assert_eq!(device.file_size(), 4096 * 128 + 4096 + 4096 * 100);

        // The following allocations come straight out of the reserve.
        let size_before = device.file_size();
        let second = device.alloc(4096).unwrap();
        let third = device.alloc(4096).unwrap();
        assert_eq!(second, first + 4096);
        assert_eq!(third, second + 4096);
        assert_eq!(device.file_size(), size_before);
    }

    #[test]
    fn alloc_excess_scales_with_file_size() {
        let dir = tempdir().unwrap();
        let device = created_device(&dir);

        device.truncate(4096 * 500).unwrap();
        device.alloc(4096).unwrap();

        // 250 <= 500 < 1000 units: reserve is 250 units.
        assert_eq!(device.file_size(), 4096 * 500 + 4096 + 4096 * 250);
    }

    #[test]
    fn reclaim_space_returns_the_reserve() {
        let dir = tempdir().unwrap();
        let device = created_device(&dir);

        device.truncate(4096 * 128).unwrap();
        let addr = device.alloc(4096).unwrap();
        device.reclaim_space().unwrap();

        assert_eq!(device.file_size(), addr + 4096);

        // A second reclaim is a no-op.
        device.reclaim_space().unwrap();
        assert_eq!(device.file_size(), addr + 4096);
    }

    #[test]
    fn open_maps_granularity_aligned_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.lode");
        {
            let mut device = DiskDevice::new(test_config());
            device.create(&path).unwrap();
            device.truncate(65536).unwrap();
            device.write(4096, &[0xAAu8; 4096]).unwrap();
            device.flush().unwrap();
        }

        let mut device = DiskDevice::new(test_config());
        device.open(&path).unwrap();

        assert!(device.is_mapped(0, 65536));
        assert!(!device.is_mapped(65536 - 4095, 4096));

        let slice = device.mapped_slice(4096, 4096).unwrap();
        assert!(slice.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn open_with_mmap_disabled_never_maps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.lode");
        {
            let mut device = DiskDevice::new(test_config());
            device.create(&path).unwrap();
            device.truncate(65536).unwrap();
        }

        let mut device = DiskDevice::new(StoreConfig {
            page_size_bytes: 4096,
            disable_mmap: true,
            ..StoreConfig::default()
        });
        device.open(&path).unwrap();

        assert!(!device.is_mapped(0, 1));
        assert!(device.mapped_slice(0, 4096).is_none());
    }

    #[test]
    fn read_page_borrows_from_the_window_when_mapped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.lode");
        {
            let mut device = DiskDevice::new(test_config());
            device.create(&path).unwrap();
            device.truncate(65536).unwrap();
            device.write(8192, &[7u8; 4096]).unwrap();
            device.flush().unwrap();
        }

        let mut device = DiskDevice::new(test_config());
        device.open(&path).unwrap();

        let mut page = Page::new(0);
        device.read_page(&mut page, 8192).unwrap();

        assert!(page.is_mapped());
        assert_eq!(page.address(), 8192);
        assert!(page.data().iter().all(|&b| b == 7));
    }

    #[test]
    fn read_page_falls_back_to_heap_past_the_window() {
        let dir = tempdir().unwrap();
        let device = created_device(&dir);
        device.truncate(16384).unwrap();
        device.write(4096, &[3u8; 4096]).unwrap();

        let mut page = Page::new(0);
        device.read_page(&mut page, 4096).unwrap();

        assert!(!page.is_mapped());
        assert!(page.data().iter().all(|&b| b == 3));

        // The heap buffer is reused for the next fetch.
        device.read_page(&mut page, 8192).unwrap();
        assert_eq!(page.address(), 8192);
        assert!(page.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn alloc_page_always_hands_out_heap_buffers() {
        let dir = tempdir().unwrap();
        let device = created_device(&dir);

        let mut page = Page::new(0);
        device.alloc_page(&mut page).unwrap();

        assert!(!page.is_mapped());
        assert_eq!(page.address(), 0);
        assert_eq!(page.data().len(), 4096);

        device.free_page(&mut page);
        assert!(!page.has_buffer());
    }

    struct XorCipher(u8);

    impl PageCipher for XorCipher {
        fn encrypt(&self, offset: u64, plain: &[u8], out: &mut [u8]) {
            let key = self.0 ^ (offset as u8);
            for (o, p) in out.iter_mut().zip(plain) {
                *o = p ^ key;
            }
        }

        fn decrypt(&self, offset: u64, data: &mut [u8]) {
            let key = self.0 ^ (offset as u8);
            for b in data.iter_mut() {
                *b ^= key;
            }
        }
    }

    fn cipher_config() -> StoreConfig {
        StoreConfig {
            page_size_bytes: 4096,
            cipher: Some(Arc::new(XorCipher(0x5C))),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn cipher_roundtrips_and_scrambles_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.lode");
        let mut device = DiskDevice::new(cipher_config());
        device.create(&path).unwrap();
        device.truncate(4096).unwrap();

        let plain = [0x11u8; 4096];
        device.write(0, &plain).unwrap();

        let mut read_back = [0u8; 4096];
        device.read(0, &mut read_back).unwrap();
        assert_eq!(read_back, plain);

        // The raw bytes on disk must differ from the plaintext.
        let raw = std::fs::read(&path).unwrap();
        assert_ne!(&raw[..4096], &plain[..]);
    }

    #[test]
    fn cipher_rejects_unaligned_writes() {
        let dir = tempdir().unwrap();
        let mut device = DiskDevice::new(cipher_config());
        device.create(dir.path().join("store.lode")).unwrap();
        device.truncate(8192).unwrap();

        assert!(device.write(100, &[0u8; 4096]).is_err());
    }

    #[test]
    fn cipher_disables_the_mmap_window() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.lode");
        {
            let mut device = DiskDevice::new(cipher_config());
            device.create(&path).unwrap();
            device.truncate(65536).unwrap();
        }

        let mut device = DiskDevice::new(cipher_config());
        device.open(&path).unwrap();

        assert!(!device.is_mapped(0, 4096));
    }
}
