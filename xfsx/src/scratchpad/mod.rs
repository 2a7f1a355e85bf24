//! Scratchpad I/O: a uniform byte source/sink abstraction backed by a
//! memory-mapped file, a streamed file descriptor, or an in-memory
//! buffer.

mod mapped;
mod memory;
mod streamed;

pub use mapped::MappedReader;
pub use memory::{MemoryReader, MemoryWriter};
pub use streamed::{StreamedReader, StreamedWriter};

use crate::error::Result;

/// A sliding read window `[prelude, cursor, end)` over buffered elements.
///
/// Implementations may evict bytes before the prelude at any time; only
/// the range actually returned by [`Reader::window`] is guaranteed live.
pub trait Reader {
    /// Bytes currently buffered and available for reading, as an
    /// absolute `(start, end)` byte range.
    fn window(&self) -> (u64, u64);

    /// The currently available byte slice.
    fn slice(&self) -> &[u8];

    /// Ensure at least `n` bytes are available ahead of the cursor,
    /// pulling more from the sink if needed.
    fn next(&mut self, n: usize) -> Result<()>;

    /// Move the cursor forward by `k` bytes (`k <= available`).
    fn advance(&mut self, k: usize) -> Result<()>;

    /// Total bytes advanced past since the reader was created.
    fn position(&self) -> u64;
}

/// A sequential write sink with a configurable flush threshold.
pub trait Writer {
    /// Return a writable slice of length `>= n`; flushes first if the
    /// buffer would otherwise exceed its `increment` threshold.
    fn obtain_chunk(&mut self, n: usize) -> Result<&mut [u8]>;

    /// Copy `bytes` into the buffer, flushing as needed.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Drain buffered bytes to the sink. Idempotent: a second flush with
    /// nothing new written performs no I/O.
    fn flush(&mut self) -> Result<()>;

    /// Total bytes written to the sink plus currently buffered.
    fn pos(&self) -> u64;
}
