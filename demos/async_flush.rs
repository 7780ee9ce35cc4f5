//! Asynchronous flush through a real pipe.
//!
//! Stages a payload much larger than the pipe's capacity and lets the
//! flush future suspend and resume its way through the backpressure.
//!
//! Run with:
//!     cargo run --example async_flush --features async-io

use stagebuf::{ChunkedBuffer, ENTRY_SIZE};
use tokio::io::AsyncReadExt;
use tokio_util::compat::TokioAsyncWriteCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let payload: Vec<u8> = (0..ENTRY_SIZE * 8 + 333).map(|i| (i % 251) as u8).collect();

    let mut buf = ChunkedBuffer::new();
    for piece in payload.chunks(1000) {
        buf.put_slice(piece);
    }
    println!(
        "staged {} bytes in {} chunks",
        buf.len(),
        buf.chunks().len()
    );

    // A 256-byte pipe guarantees the flush hits Pending many times.
    let (client, mut server) = tokio::io::duplex(256);
    let reader = tokio::spawn(async move {
        let mut received = Vec::new();
        server.read_to_end(&mut received).await.map(|_| received)
    });

    let mut writer = client.compat_write();
    let flushed = buf.flush_to_stream_async(&mut writer).await?;
    drop(writer); // close the pipe so the reader finishes
    println!("flushed {} bytes through a 256-byte pipe", flushed);

    let received = reader.await??;
    assert_eq!(received, payload);
    println!("receiver got every byte in order");

    Ok(())
}
