//! Stream I/O mode and read-loop action suggestions.

use crate::error::BufferError;

/// I/O mode of a stream.
///
/// In-memory buffers complete every operation immediately, so they always
/// run in [`IoMode::NonBlocking`]. The variant set mirrors what real
/// streams advertise, which lets a buffer stand in for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoMode {
    /// Operations may park the calling thread until they can complete.
    Blocking,
    /// Operations never park; callers observe partial progress instead.
    NonBlocking,
}

/// What a caller driving a non-blocking read loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamAction {
    /// Call `read` again immediately; the remaining bytes are already in
    /// memory.
    Retry,
}

pub(crate) fn require_non_blocking(requested: IoMode) -> Result<(), BufferError> {
    if requested == IoMode::NonBlocking {
        Ok(())
    } else {
        Err(BufferError::UnsupportedIoMode { requested })
    }
}
