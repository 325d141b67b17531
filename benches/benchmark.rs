use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use std::time::Duration;
use webscreenie::{crop, resize, script, CropRegion, Dimensions, Offset, ResizeMode};

// Fast settings for all benchmarks
fn configure_fast_group(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_millis(500));
    group.sample_size(20);
}

fn frame(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]))
}

fn benchmark_size_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_parsing");
    configure_fast_group(&mut group);

    let tokens = vec!["640x480", "1920x1080", "0x0", "100", "64Ox480", "99999999999x1"];

    group.bench_function("parse", |b| {
        b.iter(|| {
            for token in &tokens {
                let _ = black_box(token.parse::<Dimensions>());
            }
        });
    });

    group.finish();
}

fn benchmark_scaled_dimensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaled_dimensions");
    configure_fast_group(&mut group);

    let source = Dimensions::new(1280, 4096);
    let modes = [
        ResizeMode::Fit(Dimensions::new(640, 480)),
        ResizeMode::Width(320),
        ResizeMode::Height(200),
        ResizeMode::Keep,
    ];

    group.bench_function("all_modes", |b| {
        b.iter(|| {
            for mode in &modes {
                black_box(mode.scaled_dimensions(black_box(source)));
            }
        });
    });

    group.finish();
}

fn benchmark_image_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_operations");
    configure_fast_group(&mut group);

    let rendered = frame(1024, 768);
    let region = CropRegion::from_viewport(Dimensions::new(1024, 768), Offset::new(24, 68));

    group.bench_function("crop", |b| {
        b.iter(|| black_box(crop(&rendered, region)));
    });

    group.bench_function("resize_fit_640x480", |b| {
        b.iter(|| {
            black_box(resize(
                rendered.clone(),
                ResizeMode::Fit(Dimensions::new(640, 480)),
            ))
        });
    });

    group.bench_function("resize_keep", |b| {
        b.iter(|| black_box(resize(rendered.clone(), ResizeMode::Keep)));
    });

    group.finish();
}

fn benchmark_script_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("script_generation");
    configure_fast_group(&mut group);

    let css = "body { background: #fff; }\nh1 { font-size: 2em; }\n".repeat(50);

    group.bench_function("inject_style", |b| {
        b.iter(|| black_box(script::inject_style(black_box(&css))));
    });

    group.bench_function("text_zoom", |b| {
        b.iter(|| black_box(script::text_zoom(black_box(1.5))));
    });

    group.finish();
}

criterion_group!(
    unit_benches,
    benchmark_size_parsing,
    benchmark_scaled_dimensions,
    benchmark_image_operations,
    benchmark_script_generation,
);

criterion_main!(unit_benches);
