//! The flush protocol shared by both buffer types.
//!
//! A buffer exposes its committed bytes as an ordered list of segments
//! through [`FlushSource`]; the drivers here push those segments into a
//! downstream writer. Partial writes are looped on. A sync writer that
//! reports `WouldBlock` stops the flush with a partial count; an async
//! writer that returns `Pending` suspends it. A writer that accepts zero
//! bytes fails the flush as stalled.

use std::io::{self, Write};

use tracing::warn;

use crate::error::BufferError;

#[cfg(feature = "async-io")]
pub use self::future::Flush;

/// Ordered view of a buffer's committed bytes, one segment at a time.
///
/// `segment(0)`, `segment(1)`, ... are the committed bytes in order and
/// `None` marks the end. Implemented by
/// [`ChunkedBuffer`](crate::ChunkedBuffer) (one segment per chunk) and
/// [`BufferOutputStream`](crate::BufferOutputStream) (a single segment).
pub trait FlushSource {
    /// The committed bytes of segment `index`, or `None` past the end.
    fn segment(&self, index: usize) -> Option<&[u8]>;
}

/// Synchronous flush driver. Returns the number of bytes the writer
/// accepted.
pub(crate) fn drain<S, W>(source: &S, writer: &mut W) -> Result<u64, BufferError>
where
    S: FlushSource,
    W: Write,
{
    let mut flushed = 0u64;
    let mut segment = 0;
    let mut offset = 0;
    while let Some(seg) = source.segment(segment) {
        if offset == seg.len() {
            segment += 1;
            offset = 0;
            continue;
        }
        match writer.write(&seg[offset..]) {
            Ok(0) => {
                warn!(flushed, "flush stalled: downstream accepted zero bytes");
                return Err(BufferError::StalledFlush { flushed });
            }
            Ok(n) => {
                offset += n;
                flushed += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(flushed),
            Err(e) => return Err(BufferError::Io(e)),
        }
    }
    Ok(flushed)
}

#[cfg(feature = "async-io")]
mod future {
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use futures_io::AsyncWrite;
    use pin_project_lite::pin_project;
    use tracing::warn;

    use super::FlushSource;
    use crate::error::BufferError;

    pin_project! {
        /// Future returned by the `flush_to_stream_async` methods.
        ///
        /// Resolves to the number of bytes flushed. The write cursor lives
        /// in the future, so dropping it cancels the flush without
        /// touching the buffer; bytes already accepted downstream stay
        /// written.
        #[must_use = "futures do nothing unless polled"]
        pub struct Flush<'a, S, W> {
            source: &'a S,
            #[pin]
            writer: W,
            segment: usize,
            offset: usize,
            flushed: u64,
        }
    }

    impl<'a, S, W> Flush<'a, S, W> {
        pub(crate) fn new(source: &'a S, writer: W) -> Self {
            Self {
                source,
                writer,
                segment: 0,
                offset: 0,
                flushed: 0,
            }
        }
    }

    impl<S, W> Future for Flush<'_, S, W>
    where
        S: FlushSource,
        W: AsyncWrite,
    {
        type Output = Result<u64, BufferError>;

        fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            let mut this = self.project();
            loop {
                let Some(seg) = this.source.segment(*this.segment) else {
                    return Poll::Ready(Ok(*this.flushed));
                };
                if *this.offset == seg.len() {
                    *this.segment += 1;
                    *this.offset = 0;
                    continue;
                }
                match this.writer.as_mut().poll_write(cx, &seg[*this.offset..]) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Ok(0)) => {
                        warn!(
                            flushed = *this.flushed,
                            "flush stalled: downstream accepted zero bytes"
                        );
                        return Poll::Ready(Err(BufferError::StalledFlush {
                            flushed: *this.flushed,
                        }));
                    }
                    Poll::Ready(Ok(n)) => {
                        *this.offset += n;
                        *this.flushed += n as u64;
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Err(BufferError::Io(e))),
                }
            }
        }
    }
}
