//! Error types for stagebuf.

use std::fmt;

use crate::mode::IoMode;

/// Errors that can occur while staging or flushing buffered bytes.
#[derive(Debug)]
pub enum BufferError {
    /// An I/O error reported by the downstream stream during a flush.
    Io(std::io::Error),

    /// The downstream consumer accepted zero bytes. This is not
    /// backpressure (which suspends or returns a partial count); the
    /// consumer has stopped making progress entirely.
    StalledFlush {
        /// Bytes successfully flushed before the consumer stalled.
        flushed: u64,
    },

    /// A position past the committed end of the buffer.
    PositionOutOfBounds {
        /// The requested position.
        position: usize,
        /// The number of committed bytes.
        len: usize,
    },

    /// The requested I/O mode is not supported by in-memory streams.
    UnsupportedIoMode {
        /// The mode that was requested.
        requested: IoMode,
    },

    /// A stream action was requested after a read already reported
    /// end-of-data.
    ActionAfterEnd,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::Io(e) => write!(f, "io error: {}", e),
            BufferError::StalledFlush { flushed } => {
                write!(
                    f,
                    "flush stalled: consumer accepted zero bytes after {} flushed",
                    flushed
                )
            }
            BufferError::PositionOutOfBounds { position, len } => {
                write!(f, "position {} out of bounds (len {})", position, len)
            }
            BufferError::UnsupportedIoMode { requested } => {
                write!(f, "unsupported io mode: {:?}", requested)
            }
            BufferError::ActionAfterEnd => {
                write!(f, "stream action requested after end-of-data")
            }
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BufferError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BufferError {
    fn from(e: std::io::Error) -> Self {
        BufferError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "test");
        let err: BufferError = io_err.into();
        matches!(err, BufferError::Io(_));
    }

    #[test]
    fn test_display() {
        let err = BufferError::StalledFlush { flushed: 42 };
        assert!(err.to_string().contains("flush stalled"));
        assert!(err.to_string().contains("42"));

        let err = BufferError::PositionOutOfBounds {
            position: 100,
            len: 50,
        };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));
    }
}
