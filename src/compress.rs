//! # Record Compression Hook
//!
//! Pluggable compression for blob payloads. The blob manager never depends
//! on a specific algorithm; it talks to a `Compressor` and adopts the
//! compressed bytes only when they are strictly shorter than the input.
//!
//! A compressor owns two reusable buffers that persist between calls on the
//! same instance:
//!
//! - the **output** buffer holding the result of the last `compress`, and
//! - a **scratch** arena the blob manager borrows while reading compressed
//!   payload bytes off disk before decompressing them.
//!
//! Both exist to keep steady-state reads and writes allocation-free.

use eyre::Result;

/// A record compressor. Implementations are stateful only through their
/// reusable buffers; calls do not depend on each other.
pub trait Compressor {
    /// Compresses `input` into the output buffer and returns the compressed
    /// length.
    fn compress(&mut self, input: &[u8]) -> Result<usize>;

    /// The result of the last `compress` call.
    fn output(&self) -> &[u8];

    /// Decompresses `input` into `out`. `out` is exactly `expected_len`
    /// bytes; a mismatch between the decompressed length and `expected_len`
    /// is an error.
    fn decompress(&mut self, input: &[u8], expected_len: usize, out: &mut [u8]) -> Result<()>;

    /// Reusable scratch arena for staging compressed bytes read from disk.
    fn scratch(&mut self) -> &mut Vec<u8>;
}
