#![no_main]

use std::io::{self, Read, Write};

use libfuzzer_sys::fuzz_target;
use stagebuf::{BufferError, BufferInputStream, ChunkedBuffer};

/// Accepts an input-derived number of bytes per call, never zero.
struct Throttled {
    accepted: Vec<u8>,
    quotas: Vec<u8>,
    call: usize,
}

impl Write for Throttled {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let quota = self
            .quotas
            .get(self.call % self.quotas.len().max(1))
            .copied()
            .unwrap_or(1) as usize
            + 1;
        self.call += 1;
        let n = buf.len().min(quota);
        self.accepted.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// Flush through arbitrarily throttled writers and read back through an
// input stream in arbitrary slice sizes; the bytes must survive intact.
fuzz_target!(|input: (Vec<u8>, Vec<u8>)| {
    let (data, quotas) = input;

    let mut buf = ChunkedBuffer::new();
    buf.put_slice(&data);

    let mut writer = Throttled {
        accepted: Vec::new(),
        quotas: quotas.clone(),
        call: 0,
    };
    let flushed = buf.flush_to_stream(&mut writer).unwrap();
    assert_eq!(flushed, data.len() as u64, "throttling must not lose bytes");
    assert_eq!(writer.accepted, data);

    // Flushing does not consume the buffer.
    let mut again = Vec::new();
    buf.flush_to_stream(&mut again).unwrap();
    assert_eq!(again, data);

    // Drain the snapshot through a read cursor in arbitrary slice sizes.
    let mut reader = BufferInputStream::new(buf.to_bytes());
    let mut recovered = Vec::new();
    let mut slice = vec![0u8; 1];
    let mut i = 0usize;
    loop {
        let want = *quotas.get(i % quotas.len().max(1)).unwrap_or(&3) as usize + 1;
        slice.resize(want, 0);
        let n = reader.read(&mut slice).unwrap();
        if n == 0 {
            break;
        }
        recovered.extend_from_slice(&slice[..n]);
        assert!(reader.suggest_read_action(n).is_ok());
        i += 1;
    }
    assert_eq!(recovered, data);
    assert_eq!(reader.read(&mut slice).unwrap(), 0, "end-of-data repeats");
    assert!(matches!(
        reader.suggest_read_action(0),
        Err(BufferError::ActionAfterEnd)
    ));
});
