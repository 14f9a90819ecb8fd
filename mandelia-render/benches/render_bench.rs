use criterion::{criterion_group, criterion_main, Criterion};

use mandelia_core::{Complex, FractalParams, Julia, Mandelbrot, Viewport};
use mandelia_render::{compute, ModuloColoration};

fn bench_full_frame_compute(c: &mut Criterion) {
    let mandelbrot = Mandelbrot::default();
    let viewport = Viewport::default_mandelbrot(640, 480);

    c.bench_function("compute_640x480", |b| {
        b.iter(|| compute(&mandelbrot, &viewport));
    });
}

fn bench_iteration_throughput(c: &mut Criterion) {
    let mandelbrot = Mandelbrot::new(FractalParams::new(1000).unwrap());
    let viewport = Viewport::fit(Complex::new(-0.75, 0.1), 0.05, 0.05, 256, 256);

    c.bench_function("compute_256x256_1000iter", |b| {
        b.iter(|| compute(&mandelbrot, &viewport));
    });
}

fn bench_julia_compute(c: &mut Criterion) {
    let julia = Julia::new(Complex::new(-1.0, 0.0), FractalParams::default());
    let viewport = Viewport::default_julia(320, 320);

    c.bench_function("julia_320x320", |b| {
        b.iter(|| compute(&julia, &viewport));
    });
}

fn bench_colorize(c: &mut Criterion) {
    let mandelbrot = Mandelbrot::default();
    let viewport = Viewport::default_mandelbrot(640, 480);
    let result = compute(&mandelbrot, &viewport);
    let coloration = ModuloColoration::default();

    c.bench_function("colorize_640x480", |b| {
        b.iter(|| coloration.colorize(&result.iterations));
    });
}

criterion_group!(
    benches,
    bench_full_frame_compute,
    bench_iteration_throughput,
    bench_julia_compute,
    bench_colorize
);
criterion_main!(benches);
