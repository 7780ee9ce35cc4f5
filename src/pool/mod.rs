//! Thread-local pool of fixed-size chunks.
//!
//! All [`ChunkedBuffer`](crate::ChunkedBuffer) storage comes from here.
//! Chunks are [`ENTRY_SIZE`] bytes, allocated in batches of
//! [`CHUNK_BATCH_COUNT`] when a thread's free list runs dry, and pushed
//! back onto the free list of whichever thread drops them. Free lists
//! never shrink once warmed.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

use tracing::trace;

/// log2 of [`ENTRY_SIZE`]; positions convert to chunk indexes by shifting.
pub const ENTRY_SIZE_SHIFT: usize = 11;

/// Size in bytes of every pooled chunk.
pub const ENTRY_SIZE: usize = 1 << ENTRY_SIZE_SHIFT;

/// Number of chunks allocated at once when a free list is empty.
pub const CHUNK_BATCH_COUNT: usize = 32;

thread_local! {
    static FREE_CHUNKS: RefCell<Vec<Box<[u8]>>> = const { RefCell::new(Vec::new()) };
}

fn new_chunk() -> Box<[u8]> {
    vec![0u8; ENTRY_SIZE].into_boxed_slice()
}

/// A fixed-size chunk checked out of the pool.
///
/// Contents are whatever the previous user left; callers track how many
/// bytes they have written. Dropping a `PoolChunk` returns its memory to
/// the free list of the dropping thread, not necessarily the thread that
/// took it.
#[derive(Debug)]
pub(crate) struct PoolChunk {
    data: Box<[u8]>,
}

impl PoolChunk {
    /// Takes a chunk from the thread-local free list, refilling the list
    /// with a fresh batch first if it is empty. Infallible: allocation
    /// failure aborts the process.
    pub(crate) fn take() -> Self {
        let data = FREE_CHUNKS.with(|pool| {
            let mut pool = pool.borrow_mut();
            match pool.pop() {
                Some(data) => data,
                None => {
                    trace!(batch = CHUNK_BATCH_COUNT, "replenishing chunk free list");
                    for _ in 1..CHUNK_BATCH_COUNT {
                        pool.push(new_chunk());
                    }
                    new_chunk()
                }
            }
        });
        Self { data }
    }
}

impl Drop for PoolChunk {
    fn drop(&mut self) {
        // TLS may already be destroyed during thread teardown; the memory
        // then goes back to the allocator instead of the free list.
        let data = std::mem::take(&mut self.data);
        let _ = FREE_CHUNKS.try_with(|pool| pool.borrow_mut().push(data));
    }
}

impl Deref for PoolChunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for PoolChunk {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_list_len() -> usize {
        FREE_CHUNKS.with(|pool| pool.borrow().len())
    }

    fn drain_free_list() {
        FREE_CHUNKS.with(|pool| pool.borrow_mut().clear());
    }

    #[test]
    fn test_take_refills_in_batches() {
        drain_free_list();
        let chunk = PoolChunk::take();
        assert_eq!(chunk.len(), ENTRY_SIZE);
        assert_eq!(free_list_len(), CHUNK_BATCH_COUNT - 1);
    }

    #[test]
    fn test_drop_returns_to_pool() {
        drain_free_list();
        let chunk = PoolChunk::take();
        let after_take = free_list_len();
        drop(chunk);
        assert_eq!(free_list_len(), after_take + 1);
    }

    #[test]
    fn test_reuse_before_new_batch() {
        drain_free_list();
        drop(PoolChunk::take());
        let len_before = free_list_len();
        let _chunk = PoolChunk::take();
        assert_eq!(free_list_len(), len_before - 1);
    }

    #[test]
    fn test_release_on_other_thread_feeds_its_list() {
        let chunk = PoolChunk::take();
        std::thread::spawn(move || {
            assert_eq!(free_list_len(), 0);
            drop(chunk);
            assert_eq!(free_list_len(), 1);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_chunks_are_writable() {
        let mut chunk = PoolChunk::take();
        chunk[0] = 0xAB;
        chunk[ENTRY_SIZE - 1] = 0xCD;
        assert_eq!(chunk[0], 0xAB);
        assert_eq!(chunk[ENTRY_SIZE - 1], 0xCD);
    }
}
