//! Table codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use deckmap_bench::{generate_macs, random_location_table};
use deckmap_codec::CodecKind;

const CODECS: [CodecKind; 2] = [CodecKind::Text, CodecKind::Binary];

/// Benchmark encoding location tables.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let macs = generate_macs(50);

    for rows in [100usize, 1_000, 10_000] {
        let table = random_location_table("bench", rows, &macs, 4);
        group.throughput(Throughput::Elements(rows as u64));
        for kind in CODECS {
            let codec = kind.codec();
            group.bench_with_input(BenchmarkId::new(kind.to_string(), rows), &table, |b, table| {
                b.iter(|| black_box(codec.encode(black_box(table)).unwrap()));
            });
        }
    }

    group.finish();
}

/// Benchmark decoding location tables.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let macs = generate_macs(50);

    for rows in [100usize, 1_000, 10_000] {
        let table = random_location_table("bench", rows, &macs, 4);
        for kind in CODECS {
            let codec = kind.codec();
            let encoded = codec.encode(&table).unwrap();
            group.throughput(Throughput::Bytes(encoded.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(kind.to_string(), rows),
                &encoded,
                |b, encoded| {
                    b.iter(|| black_box(codec.decode("bench", black_box(encoded), None).unwrap()));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
