use blitzcrack::keyspace::{Alphabet, Keyspace};
use blitzcrack::partition::partition;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_encode(c: &mut Criterion) {
    let keyspace = Keyspace::new(Alphabet::alnum_lower(), 6).unwrap();
    c.bench_function("encode_1k_candidates", |b| {
        b.iter(|| {
            for index in 0..1_000u64 {
                black_box(keyspace.encode(black_box(index)));
            }
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let keyspace = Keyspace::new(Alphabet::alnum_lower(), 6).unwrap();
    let candidates: Vec<String> = (0..1_000u64).map(|i| keyspace.encode(i)).collect();
    c.bench_function("decode_1k_candidates", |b| {
        b.iter(|| {
            for candidate in &candidates {
                black_box(keyspace.decode(black_box(candidate)));
            }
        })
    });
}

fn bench_partition(c: &mut Criterion) {
    let keyspace = Keyspace::new(Alphabet::alnum_lower(), 6).unwrap();
    c.bench_function("partition_into_64", |b| {
        b.iter(|| partition(black_box(keyspace.total()), black_box(64)))
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_partition);
criterion_main!(benches);
