//! stagebuf
//!
//! In-memory byte buffer staging for streaming I/O.
//!
//! `stagebuf` holds bytes in memory until a real stream (a socket, a
//! pipe, a file) is ready to take them. It provides three buffer shapes
//! and one flush protocol:
//!
//! - [`ChunkedBuffer`] — append-only segmented buffer backed by pooled
//!   fixed-size chunks; grows without reallocating or moving bytes
//! - [`BufferOutputStream`] — growable contiguous buffer with a
//!   rewindable write cursor
//! - [`BufferInputStream`] — read-only cursor over an owned or borrowed
//!   byte span
//!
//! The crate intentionally:
//! - does NOT talk to sockets or files
//! - does NOT spawn or schedule anything
//! - does NOT lock; each buffer has a single logical owner
//!
//! It only does one thing: **stage bytes → flush downstream**
//!
//! # Sync
//!
//! ```
//! use std::io::Write;
//! use stagebuf::ChunkedBuffer;
//!
//! fn main() -> Result<(), stagebuf::BufferError> {
//!     let mut body = ChunkedBuffer::new();
//!     body.write_all(b"HTTP/1.1 200 OK\r\n\r\n")?;
//!     body.write_all(b"hello")?;
//!
//!     let mut wire = Vec::new();
//!     let sent = body.flush_to_stream(&mut wire)?;
//!     assert_eq!(sent, body.len() as u64);
//!     assert_eq!(wire, body.to_bytes());
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_io::AsyncWrite;
//! use stagebuf::{BufferError, ChunkedBuffer};
//!
//! async fn send<W: AsyncWrite + Unpin>(buf: &ChunkedBuffer, writer: W) -> Result<u64, BufferError> {
//!     // Suspends on backpressure, resumes when the writer is ready again.
//!     buf.flush_to_stream_async(writer).await
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunked;
mod error;
mod flush;
mod input;
mod mode;
mod output;

mod pool; // internal (thread-local chunk reuse)

//
// Public surface (intentionally tiny)
//

pub use chunked::{ChunkRef, ChunkedBuffer};
pub use error::BufferError;
pub use flush::FlushSource;
pub use input::{BufferInputStream, ByteSpan};
pub use mode::{IoMode, StreamAction};
pub use output::{BufferOutputStream, DEFAULT_GROW_BYTES, DEFAULT_INITIAL_CAPACITY};
pub use pool::{CHUNK_BATCH_COUNT, ENTRY_SIZE, ENTRY_SIZE_SHIFT};

#[cfg(feature = "async-io")]
pub use flush::Flush;
