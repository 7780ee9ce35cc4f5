//! Basic synchronous staging example.
//!
//! Accumulates a payload of unpredictable piece sizes into a
//! ChunkedBuffer, inspects it, and drains it into a writer.
//!
//! Run with:
//!     cargo run --example sync_basic

use stagebuf::{BufferOutputStream, ChunkedBuffer, ENTRY_SIZE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build a body incrementally, the write-heavy pattern the chunked
    // buffer is made for.
    let mut body = ChunkedBuffer::new();
    body.put_slice(b"HTTP/1.1 200 OK\r\n");
    body.put_slice(b"content-type: application/octet-stream\r\n\r\n");
    for i in 0..100 {
        body.put_slice(format!("record {:03}\n", i).as_bytes());
    }

    println!(
        "staged {} bytes across {} chunks of {} bytes",
        body.len(),
        body.chunks().len(),
        ENTRY_SIZE
    );

    // Random-offset read without disturbing the buffer.
    println!("status line: {:?}", body.substring(0, 17));

    // A contiguous buffer with a rewindable cursor suits
    // patch-after-write framing.
    let mut frame = BufferOutputStream::default();
    frame.put_slice(&[0u8; 4]); // length placeholder
    frame.put_slice(b"framed payload");
    let len = (frame.position() - 4) as u32;
    let end = frame.position();
    frame.set_position(0);
    frame.put_slice(&len.to_be_bytes());
    frame.set_position(end);
    println!("frame: {} bytes, length prefix {}", frame.position(), len);

    // Drain both into a sink.
    let mut wire = Vec::new();
    let sent = body.flush_to_stream(&mut wire)?;
    let sent2 = frame.flush_to_stream(&mut wire)?;
    println!("flushed {} + {} bytes downstream", sent, sent2);
    assert_eq!(wire.len() as u64, sent + sent2);

    Ok(())
}
