#![no_main]

use libfuzzer_sys::fuzz_target;
use stagebuf::{BufferOutputStream, ChunkedBuffer};

// Drive both buffer types with the same byte stream and compare every
// observable against a Vec<u8> reference model.
fuzz_target!(|data: Vec<u8>| {
    let mut chunked = ChunkedBuffer::new();
    let mut flat = BufferOutputStream::new(16, 16);
    let mut model: Vec<u8> = Vec::new();

    // Append in pieces whose sizes are themselves derived from the input,
    // so chunk boundaries land in arbitrary places.
    let mut rest = &data[..];
    let mut step = 1usize;
    while !rest.is_empty() {
        let n = step.min(rest.len());
        chunked.put_slice(&rest[..n]);
        flat.put_slice(&rest[..n]);
        model.extend_from_slice(&rest[..n]);
        rest = &rest[n..];
        step = step.wrapping_mul(31).wrapping_add(7) % 5003 + 1;
    }

    assert_eq!(chunked.len(), model.len());
    assert_eq!(flat.position(), model.len());
    assert_eq!(chunked.to_bytes(), model);
    assert_eq!(flat.as_slice(), &model[..]);

    // Random-offset reads, including out-of-range positions.
    let mut out = [0u8; 97];
    for i in 0..16 {
        let pos = (i * 1021) % (model.len() + 64);
        let n = chunked.read_substring(pos, &mut out);
        if pos >= model.len() {
            assert_eq!(n, 0);
        } else {
            let expected = &model[pos..model.len().min(pos + out.len())];
            assert_eq!(&out[..n], expected);
        }
        assert_eq!(
            chunked.substring(pos, 97),
            flat.substring(pos, 97),
            "both buffer shapes must snapshot identically at pos {}",
            pos
        );
    }

    // Chunk handles must cover the content exactly, in order.
    let mut reassembled = Vec::new();
    for chunk in chunked.chunks() {
        reassembled.extend_from_slice(&chunk);
    }
    assert_eq!(reassembled, model);

    // clear() must behave like a fresh buffer.
    chunked.clear();
    assert!(chunked.is_empty());
    chunked.put_slice(&data);
    assert_eq!(chunked.to_bytes(), data);
});
