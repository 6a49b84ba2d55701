//! Benchmarks for [`BoundedCircularBuffer`] push/evict throughput.
//!
//! Run with: cargo bench -p rewind-core --bench ring_bench
//!
//! Push into a full bounded buffer must stay flat as capacity grows, since
//! eviction reaches the oldest node through `head.prev` without traversal.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rewind_core::{BoundedCircularBuffer, Capacity};

const OPS: usize = 10_000;

fn bench_push_full(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_full");
    for cap in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(cap), &cap, |b, &cap| {
            let mut buf = BoundedCircularBuffer::new(Capacity::new(cap));
            buf.push_range(0..cap);
            b.iter(|| {
                for i in 0..OPS {
                    black_box(buf.push(black_box(i)));
                }
            });
        });
    }
    group.finish();
}

fn bench_push_pop(c: &mut Criterion) {
    c.bench_function("push_pop_unbounded", |b| {
        let mut buf = BoundedCircularBuffer::unbounded();
        b.iter(|| {
            for i in 0..OPS {
                buf.push(black_box(i));
            }
            while let Some(v) = buf.try_pop() {
                black_box(v);
            }
        });
    });
}

fn bench_push_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_range_overflow");
    for cap in [64usize, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(cap), &cap, |b, &cap| {
            let mut buf = BoundedCircularBuffer::new(Capacity::new(cap));
            b.iter(|| {
                buf.push_range(black_box(0..cap * 4));
                black_box(buf.len());
            });
        });
    }
    group.finish();
}

fn bench_shrink(c: &mut Criterion) {
    c.bench_function("shrink_4096_to_16", |b| {
        b.iter(|| {
            let mut buf = BoundedCircularBuffer::new(Capacity::new(4096));
            buf.push_range(0..4096usize);
            black_box(buf.set_capacity(Capacity::new(16)).len());
        });
    });
}

criterion_group!(
    benches,
    bench_push_full,
    bench_push_pop,
    bench_push_range,
    bench_shrink
);
criterion_main!(benches);
