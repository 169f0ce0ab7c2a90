use ckks_keygen::codec;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{thread_rng, RngCore};
use std::time::Duration;

pub fn codec_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(1));

    for size in [1 << 10, 1 << 16, 1 << 20] {
        let mut bytes = vec![0u8; size];
        thread_rng().fill_bytes(&mut bytes);
        let text = codec::encode(&bytes);

        group.bench_function(BenchmarkId::new("encode", size), |b| {
            b.iter(|| codec::encode(black_box(&bytes)));
        });

        group.bench_function(BenchmarkId::new("decode", size), |b| {
            b.iter(|| codec::decode(black_box(&text)));
        });
    }

    group.finish();
}

criterion_group!(codec_bench, codec_benchmark);
criterion_main!(codec_bench);
