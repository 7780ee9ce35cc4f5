//! Growable contiguous buffer with a rewindable write cursor.

use std::io::{self, Write};

use bytes::Bytes;

#[cfg(feature = "async-io")]
use futures_io::AsyncWrite;

use crate::error::BufferError;
#[cfg(feature = "async-io")]
use crate::flush::Flush;
use crate::flush::FlushSource;
use crate::mode::{IoMode, require_non_blocking};

/// Default capacity of a [`BufferOutputStream`].
pub const DEFAULT_INITIAL_CAPACITY: usize = 2048;

/// Default growth step of a [`BufferOutputStream`].
pub const DEFAULT_GROW_BYTES: usize = 2048;

/// Contiguous in-memory buffer with a write cursor.
///
/// Writes land at the cursor and move it forward, growing the buffer in
/// multiples of the growth step when needed. Rewinding the cursor allows
/// in-place overwrite of already-written bytes (length prefixes, patched
/// headers); moving it forward again re-exposes whatever the storage
/// holds there.
#[derive(Debug)]
pub struct BufferOutputStream {
    buf: Vec<u8>,
    position: usize,
    grow_bytes: usize,
}

impl BufferOutputStream {
    /// Creates a buffer with the given capacity and growth step.
    ///
    /// `grow_bytes == 0` disables growth: the capacity is final and
    /// overflowing it is a contract violation.
    pub fn new(initial_capacity: usize, grow_bytes: usize) -> Self {
        Self {
            buf: vec![0u8; initial_capacity],
            position: 0,
            grow_bytes,
        }
    }

    /// Write cursor; doubles as the number of committed bytes.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the write cursor.
    ///
    /// # Panics
    ///
    /// Panics if `pos` exceeds the current capacity.
    pub fn set_position(&mut self, pos: usize) {
        assert!(
            pos <= self.buf.len(),
            "position {} exceeds capacity {}",
            pos,
            self.buf.len()
        );
        self.position = pos;
    }

    /// Current capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The committed bytes, `[0, position)`.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.position]
    }

    /// Returns true if the cursor is at the start.
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// Ensures capacity for `additional` more bytes at the cursor,
    /// without moving the cursor. Growth is by whole multiples of the
    /// growth step; existing bytes are preserved.
    ///
    /// # Panics
    ///
    /// Panics if growth is disabled and the buffer would overflow.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.position.saturating_add(additional);
        if required <= self.buf.len() {
            return;
        }
        assert!(
            self.grow_bytes > 0,
            "buffer overflow: capacity {} is fixed, {} bytes required",
            self.buf.len(),
            required
        );
        let shortfall = required - self.buf.len();
        let steps = shortfall.div_ceil(self.grow_bytes);
        let new_capacity = self.buf.len().saturating_add(steps.saturating_mul(self.grow_bytes));
        self.buf.resize(new_capacity, 0);
    }

    /// Writes `data` at the cursor, growing as needed.
    ///
    /// # Panics
    ///
    /// Panics if growth is disabled and `data` does not fit; see
    /// [`reserve`](Self::reserve).
    pub fn put_slice(&mut self, data: &[u8]) {
        self.reserve(data.len());
        self.buf[self.position..self.position + data.len()].copy_from_slice(data);
        self.position += data.len();
    }

    /// Owned snapshot of the committed bytes.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_slice())
    }

    /// Owned snapshot of `count` bytes starting at `pos`, clamped to the
    /// committed range `[0, position)`. Out-of-range positions yield an
    /// empty snapshot, never an error.
    pub fn substring(&self, pos: usize, count: usize) -> Bytes {
        let start = pos.min(self.position);
        let end = pos.saturating_add(count).min(self.position);
        Bytes::copy_from_slice(&self.buf[start..end])
    }

    /// Writes the committed bytes to `writer`, looping over partial
    /// writes, and returns the number of bytes the writer accepted. The
    /// buffer itself is left untouched.
    ///
    /// A writer that reports [`io::ErrorKind::WouldBlock`] stops the
    /// flush early with the partial count as `Ok`; a writer that accepts
    /// zero bytes fails with [`BufferError::StalledFlush`].
    pub fn flush_to_stream<W: Write>(&self, writer: &mut W) -> Result<u64, BufferError> {
        crate::flush::drain(self, writer)
    }

    /// Flushes asynchronously. Same progress and stall semantics as
    /// [`flush_to_stream`](Self::flush_to_stream), except backpressure
    /// suspends the returned future instead of ending the flush.
    #[cfg(feature = "async-io")]
    pub fn flush_to_stream_async<W: AsyncWrite>(&self, writer: W) -> Flush<'_, Self, W> {
        Flush::new(self, writer)
    }

    /// I/O mode of this stream. Always [`IoMode::NonBlocking`]; every
    /// operation completes immediately.
    pub fn io_mode(&self) -> IoMode {
        IoMode::NonBlocking
    }

    /// Accepts only [`IoMode::NonBlocking`].
    pub fn set_io_mode(&mut self, mode: IoMode) -> Result<(), BufferError> {
        require_non_blocking(mode)
    }
}

impl Default for BufferOutputStream {
    /// Equivalent to `new(DEFAULT_INITIAL_CAPACITY, DEFAULT_GROW_BYTES)`.
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPACITY, DEFAULT_GROW_BYTES)
    }
}

impl FlushSource for BufferOutputStream {
    fn segment(&self, index: usize) -> Option<&[u8]> {
        (index == 0).then(|| self.as_slice())
    }
}

impl Write for BufferOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
