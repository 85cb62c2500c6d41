use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use kuwahara_image::{Image, ImageSize};
use kuwahara_imgproc::{
    kuwahara::{KuwaharaFilter, KuwaharaOutput, KuwaharaParams, KuwaharaVariant},
    parallel::ExecutionStrategy,
};

fn random_image(size: ImageSize) -> Image<f32, 3> {
    let mut rng = rand::rng();
    let data = (0..size.num_pixels() * 3)
        .map(|_| rng.random::<f32>())
        .collect();
    Image::new(size, data).unwrap()
}

fn bench_kuwahara(c: &mut Criterion) {
    let mut group = c.benchmark_group("Kuwahara");
    group.sample_size(10);

    for (width, height) in [(256, 224), (512, 448)].iter() {
        for kernel_radius in [2.0f32, 4.0].iter() {
            group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

            let parameter_string = format!("{}x{}x{}", width, height, kernel_radius);

            let image_size = ImageSize {
                width: *width,
                height: *height,
            };
            let image = random_image(image_size);

            for (variant, skew) in [
                (KuwaharaVariant::Isotropic, 0.0),
                (KuwaharaVariant::Anisotropic, 1.0),
            ] {
                let params = KuwaharaParams::default()
                    .with_kernel_radius(*kernel_radius)
                    .with_kernel_skew(skew)
                    .with_variant(variant);

                group.bench_with_input(
                    BenchmarkId::new(format!("{variant:?}"), &parameter_string),
                    &image,
                    |b, src| {
                        let mut filter = KuwaharaFilter::new(image_size, params)
                            .unwrap()
                            .with_strategy(ExecutionStrategy::Parallel);
                        let mut out = KuwaharaOutput::new(image_size).unwrap();
                        b.iter(|| black_box(filter.apply(src, &mut out)))
                    },
                );
            }
        }
    }
    group.finish();
}

criterion_group!(benches, bench_kuwahara);
criterion_main!(benches);
