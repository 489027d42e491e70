use collage_core::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn generate_photos(count: usize) -> Vec<(String, u32, u32)> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    // mix of landscape and portrait camera-sized frames
    (0..count)
        .map(|i| {
            let (w, h) = if rng.gen_bool(0.6) { (4000, 3000) } else { (3000, 4000) };
            let jitter = rng.gen_range(0..400);
            (format!("photo_{}", i), w - jitter, h)
        })
        .collect()
}

fn bench_pack_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_rows");

    for count in [50, 200, 1000] {
        let photos = generate_photos(count);
        group.throughput(Throughput::Elements(count as u64));

        for row_height in [120u32, 400] {
            group.bench_with_input(
                BenchmarkId::new(format!("row_height_{row_height}"), count),
                &photos,
                |b, photos| {
                    let cfg = CollageConfig::builder()
                        .with_dimensions(2400, row_height)
                        .build();
                    b.iter(|| black_box(pack_sizes(photos.clone(), &cfg).expect("pack")));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_pack_sizes);
criterion_main!(benches);
