//! Flushing into a slow consumer.
//!
//! Shows the three downstream behaviors the flush protocol
//! distinguishes: partial accepts (looped on), WouldBlock
//! (partial-count return), and a dead consumer (StalledFlush).
//!
//! Run with:
//!     cargo run --example backpressure

use std::io::{self, Write};

use stagebuf::{BufferError, ChunkedBuffer};

/// Accepts at most `per_call` bytes per write, then `WouldBlock`s once
/// `budget` runs out — a caricature of a socket send buffer.
struct SlowSocket {
    accepted: Vec<u8>,
    per_call: usize,
    budget: usize,
}

impl Write for SlowSocket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "send buffer full"));
        }
        let n = buf.len().min(self.per_call).min(self.budget);
        self.budget -= n;
        self.accepted.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Accepts zero bytes: a consumer that has stopped making progress.
struct DeadPeer;

impl Write for DeadPeer {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut buf = ChunkedBuffer::new();
    buf.put_slice(&vec![0x42u8; 100]);

    // Plenty of budget: the flush loops over the 7-byte accepts until
    // everything is through.
    let mut socket = SlowSocket {
        accepted: Vec::new(),
        per_call: 7,
        budget: usize::MAX,
    };
    let flushed = buf.flush_to_stream(&mut socket)?;
    println!("patient consumer: flushed {}/{} bytes", flushed, buf.len());

    // Limited budget: backpressure ends the flush early with the
    // partial count as Ok, not an error.
    let mut socket = SlowSocket {
        accepted: Vec::new(),
        per_call: 7,
        budget: 30,
    };
    let flushed = buf.flush_to_stream(&mut socket)?;
    println!(
        "backpressured consumer: flushed {}/{} bytes, retry later",
        flushed,
        buf.len()
    );

    // Zero progress is a distinct failure, not backpressure.
    match buf.flush_to_stream(&mut DeadPeer) {
        Err(BufferError::StalledFlush { flushed }) => {
            println!("dead consumer: stalled after {} bytes", flushed)
        }
        other => println!("unexpected: {:?}", other.map(|_| ())),
    }

    Ok(())
}
