//! Read-only cursor over an owned or borrowed byte span.

use std::io::{self, Read};

use bytes::Bytes;
use tracing::error;

use crate::error::BufferError;
use crate::mode::{IoMode, StreamAction, require_non_blocking};

#[cfg(feature = "async-io")]
use std::pin::Pin;
#[cfg(feature = "async-io")]
use std::task::{Context, Poll};

/// The bytes a [`BufferInputStream`] reads from.
///
/// `Owned` keeps the underlying allocation alive for as long as the
/// stream (or the span itself) exists; `Borrowed` reads from memory owned
/// elsewhere, with the borrow checked at compile time.
#[derive(Debug, Clone)]
pub enum ByteSpan<'a> {
    /// The span holds its bytes.
    Owned(Bytes),
    /// The span borrows its bytes.
    Borrowed(&'a [u8]),
}

impl ByteSpan<'_> {
    /// The empty span.
    pub const fn empty() -> ByteSpan<'static> {
        ByteSpan::Borrowed(&[])
    }

    /// The bytes of the span.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            ByteSpan::Owned(bytes) => bytes,
            ByteSpan::Borrowed(slice) => slice,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true if the span has no bytes.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<Bytes> for ByteSpan<'static> {
    fn from(bytes: Bytes) -> Self {
        ByteSpan::Owned(bytes)
    }
}

impl From<Vec<u8>> for ByteSpan<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        ByteSpan::Owned(Bytes::from(bytes))
    }
}

impl<'a> From<&'a [u8]> for ByteSpan<'a> {
    fn from(slice: &'a [u8]) -> Self {
        ByteSpan::Borrowed(slice)
    }
}

/// Read cursor over a byte span.
///
/// A zero-byte read means the span is exhausted; the stream stays at the
/// end and keeps reporting zero. [`reset`](Self::reset) rebinds the
/// stream to a new span so one instance can serve many payloads.
#[derive(Debug)]
pub struct BufferInputStream<'a> {
    span: ByteSpan<'a>,
    position: usize,
}

impl<'a> BufferInputStream<'a> {
    /// Creates a stream reading from `span`, cursor at the start.
    pub fn new(span: impl Into<ByteSpan<'a>>) -> Self {
        Self {
            span: span.into(),
            position: 0,
        }
    }

    /// Rebinds the stream to a new span and rewinds the cursor.
    /// `reset(ByteSpan::empty())` detaches the current span entirely.
    pub fn reset(&mut self, span: impl Into<ByteSpan<'a>>) {
        self.span = span.into();
        self.position = 0;
    }

    /// The span this stream reads from.
    pub fn span(&self) -> &ByteSpan<'a> {
        &self.span
    }

    /// All bytes of the span, independent of the cursor.
    pub fn as_slice(&self) -> &[u8] {
        self.span.as_slice()
    }

    /// Total length of the span.
    pub fn len(&self) -> usize {
        self.span.len()
    }

    /// Returns true if the span has no bytes.
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Read cursor.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the read cursor.
    ///
    /// # Panics
    ///
    /// Panics if `pos` exceeds the span length.
    pub fn set_position(&mut self, pos: usize) {
        assert!(
            pos <= self.span.len(),
            "position {} exceeds span length {}",
            pos,
            self.span.len()
        );
        self.position = pos;
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.span.len() - self.position
    }

    /// What a non-blocking read loop should do after a read returned
    /// `last_read` bytes.
    ///
    /// In-memory reads always complete, so a positive count means "keep
    /// reading". A zero-byte read already told the caller the stream is
    /// done; asking for an action after that is a caller bug and fails
    /// with [`BufferError::ActionAfterEnd`].
    pub fn suggest_read_action(&self, last_read: usize) -> Result<StreamAction, BufferError> {
        if last_read > 0 {
            Ok(StreamAction::Retry)
        } else {
            error!(
                position = self.position,
                "stream action requested after end-of-data read"
            );
            Err(BufferError::ActionAfterEnd)
        }
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

    fn read_impl(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.remaining());
        let start = self.position;
        out[..n].copy_from_slice(&self.span.as_slice()[start..start + n]);
        self.position += n;
        n
    }
}

impl Read for BufferInputStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_impl(buf))
    }
}

#[cfg(feature = "async-io")]
impl futures_io::AsyncRead for BufferInputStream<'_> {
    /// Never returns `Pending`; the bytes are already in memory.
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(self.get_mut().read_impl(buf)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_in_fixed_slices() {
        let mut stream = BufferInputStream::new(&b"hello world"[..]);
        let mut out = [0u8; 4];
        assert_eq!(stream.read(&mut out).unwrap(), 4);
        assert_eq!(&out, b"hell");
        assert_eq!(stream.read(&mut out).unwrap(), 4);
        assert_eq!(&out, b"o wo");
        assert_eq!(stream.read(&mut out).unwrap(), 3);
        assert_eq!(&out[..3], b"rld");
    }

    #[test]
    fn test_end_of_data_is_sticky() {
        let mut stream = BufferInputStream::new(&b"abc"[..]);
        let mut out = [0u8; 8];
        assert_eq!(stream.read(&mut out).unwrap(), 3);
        assert_eq!(stream.read(&mut out).unwrap(), 0);
        assert_eq!(stream.read(&mut out).unwrap(), 0);
        assert_eq!(stream.position(), 3);
        assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn test_owned_span_outlives_caller_scope() {
        let stream = {
            let data = vec![1u8, 2, 3, 4];
            BufferInputStream::new(Bytes::from(data))
        };
        assert_eq!(stream.as_slice(), &[1, 2, 3, 4]);
        assert!(matches!(stream.span(), ByteSpan::Owned(_)));
    }

    #[test]
    fn test_reset_rebinds_and_rewinds() {
        let mut stream = BufferInputStream::new(Bytes::from_static(b"first payload"));
        let mut out = [0u8; 5];
        assert_eq!(stream.read(&mut out).unwrap(), 5);
        assert_eq!(stream.position(), 5);

        stream.reset(Bytes::from_static(b"second"));
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.len(), 6);
        let mut all = Vec::new();
        stream.read_to_end(&mut all).unwrap();
        assert_eq!(all, b"second");

        stream.reset(ByteSpan::empty());
        assert!(stream.is_empty());
        assert_eq!(stream.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_set_position_rewinds() {
        let mut stream = BufferInputStream::new(&b"abcdef"[..]);
        let mut out = [0u8; 6];
        assert_eq!(stream.read(&mut out).unwrap(), 6);
        stream.set_position(2);
        assert_eq!(stream.remaining(), 4);
        assert_eq!(stream.read(&mut out).unwrap(), 4);
        assert_eq!(&out[..4], b"cdef");
    }

    #[test]
    #[should_panic(expected = "exceeds span length")]
    fn test_set_position_past_end_panics() {
        let mut stream = BufferInputStream::new(&b"abc"[..]);
        stream.set_position(4);
    }

    #[test]
    fn test_suggest_read_action() {
        let stream = BufferInputStream::new(&b"abc"[..]);
        assert_eq!(stream.suggest_read_action(3).unwrap(), StreamAction::Retry);
        assert!(matches!(
            stream.suggest_read_action(0),
            Err(BufferError::ActionAfterEnd)
        ));
    }

    #[test]
    fn test_empty_read_buffer() {
        let mut stream = BufferInputStream::new(&b"abc"[..]);
        let mut out = [0u8; 0];
        assert_eq!(stream.read(&mut out).unwrap(), 0);
        assert_eq!(stream.remaining(), 3);
    }

    #[test]
    fn test_io_mode() {
        let mut stream = BufferInputStream::new(&b"abc"[..]);
        assert_eq!(stream.io_mode(), IoMode::NonBlocking);
        assert!(stream.set_io_mode(IoMode::NonBlocking).is_ok());
        assert!(matches!(
            stream.set_io_mode(IoMode::Blocking),
            Err(BufferError::UnsupportedIoMode { .. })
        ));
    }

    #[cfg(feature = "async-io")]
    mod async_tests {
        use super::*;

        async fn read_all<R: futures_io::AsyncRead + Unpin>(mut reader: R) -> Vec<u8> {
            use futures_util::AsyncReadExt;
            let mut out = Vec::new();
            reader.read_to_end(&mut out).await.unwrap();
            out
        }

        #[tokio::test]
        async fn test_async_read_is_always_ready() {
            let mut stream = BufferInputStream::new(Bytes::from_static(b"async span"));
            assert_eq!(read_all(&mut stream).await, b"async span");
            assert_eq!(stream.position(), stream.len());

            // exhausted stream keeps reporting end-of-data
            assert_eq!(read_all(&mut stream).await, b"");
        }
    }
}
