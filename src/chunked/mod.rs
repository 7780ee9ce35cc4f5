//! Append-only segmented buffer backed by pooled chunks.

use std::io::{self, Write};
use std::sync::Arc;

use bytes::Bytes;

#[cfg(feature = "async-io")]
use futures_io::AsyncWrite;

use crate::error::BufferError;
#[cfg(feature = "async-io")]
use crate::flush::Flush;
use crate::flush::FlushSource;
use crate::mode::{IoMode, require_non_blocking};
use crate::pool::{ENTRY_SIZE, ENTRY_SIZE_SHIFT, PoolChunk};

/// A shared handle to one chunk of a [`ChunkedBuffer`].
///
/// Handles returned by [`ChunkedBuffer::chunks`] stay valid after the
/// buffer is cleared or dropped; the underlying memory returns to the
/// pool once the last handle goes away.
#[derive(Debug, Clone)]
pub struct ChunkRef {
    chunk: Arc<PoolChunk>,
    len: usize,
}

impl ChunkRef {
    /// The bytes committed to this chunk.
    pub fn as_slice(&self) -> &[u8] {
        &self.chunk[..self.len]
    }

    /// Number of committed bytes. Every chunk except possibly the last
    /// holds exactly [`ENTRY_SIZE`].
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing was committed to this chunk.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::ops::Deref for ChunkRef {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for ChunkRef {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Append-only byte buffer that grows by fixed-size pooled chunks.
///
/// Appends never reallocate or move previously written bytes: full chunks
/// are sealed in place and a fresh chunk is taken from the pool when the
/// current one fills. Random-offset reads, owned snapshots and flushing
/// are available at any time and do not disturb the write position.
#[derive(Debug, Default)]
pub struct ChunkedBuffer {
    sealed: Vec<Arc<PoolChunk>>,
    tail: Option<PoolChunk>,
    /// Bytes committed to `tail`; `ENTRY_SIZE` means the tail is full and
    /// the next write seals it before taking a new chunk.
    write_offset: usize,
    len: usize,
}

impl ChunkedBuffer {
    /// Creates an empty buffer. No chunk is taken until the first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of committed bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been written since creation or the
    /// last [`clear`](Self::clear).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `data`, taking chunks from the pool as needed. Never
    /// rejects bytes.
    pub fn put_slice(&mut self, data: &[u8]) {
        let mut rest = data;
        while !rest.is_empty() {
            if self.write_offset == ENTRY_SIZE {
                self.seal_tail();
            }
            let tail = self.tail.get_or_insert_with(PoolChunk::take);
            let n = rest.len().min(ENTRY_SIZE - self.write_offset);
            tail[self.write_offset..self.write_offset + n].copy_from_slice(&rest[..n]);
            self.write_offset += n;
            self.len += n;
            rest = &rest[n..];
        }
    }

    fn seal_tail(&mut self) {
        if let Some(tail) = self.tail.take() {
            self.sealed.push(Arc::new(tail));
        }
        self.write_offset = 0;
    }

    /// Maps an absolute position to `(chunk_index, offset_in_chunk)`.
    ///
    /// `pos == len()` is the one-past-the-end coordinate and is allowed;
    /// anything beyond fails with [`BufferError::PositionOutOfBounds`].
    pub fn locate(&self, pos: usize) -> Result<(usize, usize), BufferError> {
        if pos > self.len {
            return Err(BufferError::PositionOutOfBounds {
                position: pos,
                len: self.len,
            });
        }
        Ok((pos >> ENTRY_SIZE_SHIFT, pos & (ENTRY_SIZE - 1)))
    }

    /// Committed bytes of chunk `index`, or `None` past the last chunk.
    fn chunk_slice(&self, index: usize) -> Option<&[u8]> {
        if index < self.sealed.len() {
            Some(&self.sealed[index][..])
        } else if index == self.sealed.len() {
            self.tail.as_ref().map(|tail| &tail[..self.write_offset])
        } else {
            None
        }
    }

    /// Copies up to `out.len()` bytes starting at `pos` into `out`,
    /// returning how many were copied.
    ///
    /// Requests past the committed end are clamped; `pos >= len()` copies
    /// nothing. Never fails.
    pub fn read_substring(&self, pos: usize, out: &mut [u8]) -> usize {
        if pos >= self.len || out.is_empty() {
            return 0;
        }
        let count = out.len().min(self.len - pos);
        let mut index = pos >> ENTRY_SIZE_SHIFT;
        let mut offset = pos & (ENTRY_SIZE - 1);
        let mut copied = 0;
        while copied < count {
            let Some(chunk) = self.chunk_slice(index) else {
                break;
            };
            let n = (count - copied).min(chunk.len() - offset);
            out[copied..copied + n].copy_from_slice(&chunk[offset..offset + n]);
            copied += n;
            index += 1;
            offset = 0;
        }
        copied
    }

    /// Owned copy of `count` bytes starting at `pos`, clamped to the
    /// committed range. Out-of-range positions yield an empty snapshot,
    /// never an error.
    pub fn substring(&self, pos: usize, count: usize) -> Bytes {
        let count = count.min(self.len.saturating_sub(pos));
        let mut out = vec![0u8; count];
        let copied = self.read_substring(pos, &mut out);
        out.truncate(copied);
        Bytes::from(out)
    }

    /// Owned copy of the whole buffer.
    pub fn to_bytes(&self) -> Bytes {
        self.substring(0, self.len)
    }

    /// Shared handles to every chunk, in order.
    ///
    /// Sealed chunks are shared without copying. The chunk still being
    /// written is snapshotted into a fresh pool chunk so the handle cannot
    /// observe later appends. Buffer state is not modified.
    pub fn chunks(&self) -> Vec<ChunkRef> {
        let mut refs: Vec<ChunkRef> = self
            .sealed
            .iter()
            .map(|chunk| ChunkRef {
                chunk: Arc::clone(chunk),
                len: ENTRY_SIZE,
            })
            .collect();
        if let Some(tail) = &self.tail {
            let mut copy = PoolChunk::take();
            copy[..self.write_offset].copy_from_slice(&tail[..self.write_offset]);
            refs.push(ChunkRef {
                chunk: Arc::new(copy),
                len: self.write_offset,
            });
        }
        refs
    }

    /// Releases every chunk back to the pool and resets to empty.
    ///
    /// Chunks still referenced through [`ChunkRef`] handles are recycled
    /// once the last handle drops. The chunk list keeps its allocation
    /// for reuse. Idempotent.
    pub fn clear(&mut self) {
        self.sealed.clear();
        self.tail = None;
        self.write_offset = 0;
        self.len = 0;
    }

    /// Writes all committed bytes to `writer`, looping over partial
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

impl FlushSource for ChunkedBuffer {
    fn segment(&self, index: usize) -> Option<&[u8]> {
        self.chunk_slice(index)
    }
}

impl Write for ChunkedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
