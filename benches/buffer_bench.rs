//! Benchmarks for stagebuf.
//!
//! Run with:
//!     cargo bench

use std::io;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use stagebuf::{BufferOutputStream, ChunkedBuffer, ENTRY_SIZE};

fn bench_chunked_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunked_append");

    for size in [4 * 1024, 64 * 1024, 1024 * 1024] {
        let data: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(format!("pieces_{}kb", size / 1024), &data, |b, data| {
            b.iter(|| {
                let mut buf = ChunkedBuffer::new();
                for piece in data.chunks(977) {
                    buf.put_slice(black_box(piece));
                }
                black_box(buf.len())
            });
        });

        group.bench_with_input(format!("one_shot_{}kb", size / 1024), &data, |b, data| {
            b.iter(|| {
                let mut buf = ChunkedBuffer::new();
                buf.put_slice(black_box(data));
                black_box(buf.len())
            });
        });
    }

    group.finish();
}

fn bench_contiguous_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("contiguous_append");
    let size = 1024 * 1024;
    let data: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("grow_from_default", |b| {
        b.iter(|| {
            let mut buf = BufferOutputStream::default();
            for piece in data.chunks(977) {
                buf.put_slice(black_box(piece));
            }
            black_box(buf.position())
        });
    });

    group.bench_function("preallocated", |b| {
        b.iter(|| {
            let mut buf = BufferOutputStream::new(size, 0);
            for piece in data.chunks(977) {
                buf.put_slice(black_box(piece));
            }
            black_box(buf.position())
        });
    });

    group.finish();
}

fn bench_random_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_reads");
    let size = 1024 * 1024;
    let data: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();
    let mut buf = ChunkedBuffer::new();
    buf.put_slice(&data);

    // offsets scattered around chunk boundaries
    let positions: Vec<usize> = (0..1024)
        .map(|i| (i * 8191 + ENTRY_SIZE / 2) % (size - 256))
        .collect();

    group.bench_function("read_substring_256b", |b| {
        let mut out = [0u8; 256];
        b.iter(|| {
            let mut total = 0usize;
            for &pos in &positions {
                total += buf.read_substring(black_box(pos), &mut out);
            }
            black_box(total)
        });
    });

    group.bench_function("substring_256b", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for &pos in &positions {
                total += buf.substring(black_box(pos), 256).len();
            }
            black_box(total)
        });
    });

    group.finish();
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");
    let size = 1024 * 1024;
    let data: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();

    let mut chunked = ChunkedBuffer::new();
    chunked.put_slice(&data);
    let mut flat = BufferOutputStream::new(size, 0);
    flat.put_slice(&data);

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("chunked_to_sink", |b| {
        b.iter(|| {
            let flushed = chunked.flush_to_stream(&mut io::sink()).unwrap();
            black_box(flushed)
        });
    });

    group.bench_function("contiguous_to_sink", |b| {
        b.iter(|| {
            let flushed = flat.flush_to_stream(&mut io::sink()).unwrap();
            black_box(flushed)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_chunked_append,
    bench_contiguous_append,
    bench_random_reads,
    bench_flush
);
criterion_main!(benches);
