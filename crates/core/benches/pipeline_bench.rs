use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use chartmine_core::ExtractConfig;
use chartmine_core::chart::{classify_all, normalize, resolve, segment};
use chartmine_core::graphics::{Path, Primitive, StyleDescriptor, read_svg, write_svg};
use chartmine_core::pipeline::process_graphics;

/// Deterministic trend noise.
struct XorShift64(u64);

impl XorShift64 {
    fn gen_f64(&mut self, min: f64, max: f64) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        min + (max - min) * (x as f64 / u64::MAX as f64)
    }
}

/// `n` charts in a six-column grid, each with a 43-day random walk.
fn gen_primitives(seed: u64, n: usize) -> Vec<Primitive> {
    let mut rng = XorShift64(seed.max(1));
    let axis = StyleDescriptor::from_css("fill:none;stroke:#dadce0;stroke-width:1.19px");
    let trend = StyleDescriptor::from_css("fill:none;stroke:#4285f4;stroke-width:2px");
    let mut primitives = Vec::with_capacity(n * 6);
    for i in 0..n {
        let x0 = 500.0 * (i % 6) as f64;
        let top = 300.0 * (i / 6) as f64;
        for k in 0..5 {
            let y = top + 40.0 * k as f64;
            primitives.push(Primitive::new(Path::line((x0, y), (x0 + 420.0, y)), Some(axis.clone())));
        }
        let mut value: f64 = 0.0;
        let points: Vec<(f64, f64)> = (0..43)
            .map(|day| {
                value = (value + rng.gen_f64(-5.0, 5.0)).clamp(-75.0, 75.0);
                (x0 + 10.0 * day as f64, top + 80.0 - value)
            })
            .collect();
        primitives.push(Primitive::new(Path::polyline(&points), Some(trend.clone())));
    }
    primitives
}

fn bench_pipeline(c: &mut Criterion) {
    let config = ExtractConfig::default();
    let mut group = c.benchmark_group("pipeline");

    for &n in &[18usize, 150] {
        let primitives = gen_primitives(0x5EED ^ n as u64, n);
        let svg = write_svg(&primitives).unwrap();
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("read_svg", n), &svg, |b, svg| {
            b.iter(|| black_box(read_svg(svg).unwrap().primitives.len()))
        });

        group.bench_with_input(BenchmarkId::new("segment", n), &primitives, |b, primitives| {
            b.iter(|| {
                let charts = segment(classify_all(primitives.clone(), &config.classifier));
                black_box(charts.len())
            })
        });

        let charts = segment(classify_all(primitives.clone(), &config.classifier));
        group.bench_with_input(BenchmarkId::new("normalize", n), &charts, |b, charts| {
            b.iter(|| {
                let samples: usize = charts
                    .iter()
                    .filter_map(|chart| resolve(chart).and_then(|r| normalize(&r, config.span)).ok())
                    .map(|series| series.len())
                    .sum();
                black_box(samples)
            })
        });

        group.bench_with_input(BenchmarkId::new("process_graphics", n), &svg, |b, svg| {
            b.iter(|| {
                let output = process_graphics(read_svg(svg).unwrap(), &config).unwrap();
                black_box(output.series.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
