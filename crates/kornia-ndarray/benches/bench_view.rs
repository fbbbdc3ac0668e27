use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use kornia_ndarray::{NdArray, Slice};
use rand::Rng;

fn sample_array() -> NdArray<f32> {
    let mut rng = rand::rng();
    NdArray::from_shape_fn(&[256, 256, 3], |_| rng.random::<f32>()).unwrap()
}

fn bench_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("View");
    let array = sample_array();

    group.bench_function("iter_consistent", |b| {
        b.iter(|| black_box(&array).iter().fold(0.0f32, |acc, v| acc + v))
    });

    group.bench_function("iter_transposed", |b| {
        let t = array.transpose(&[2, 0, 1]).unwrap();
        b.iter(|| black_box(&t).iter().fold(0.0f32, |acc, v| acc + v))
    });

    group.bench_function("deep_copy_transposed", |b| {
        b.iter_batched(
            sample_array,
            |a| black_box(a).transpose(&[2, 0, 1]).unwrap().deep_copy(),
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("slice_get", |b| {
        let s = array
            .slice(Slice::new(0, -1, 2).unwrap(), 0)
            .unwrap();
        b.iter(|| black_box(&s).get3(64, 128, 1).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_view);
criterion_main!(benches);
