//! Benchmark projection and frame composition per revolution.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use drishti_view::core::types::{Sample, Scan};
use drishti_view::render::{FrameCompositor, FrameStyle, ProjectionConfig, RasterSize, project_into};
use std::f32::consts::PI;

/// Rectangular room seen from its center, `n` samples per revolution.
fn room_scan(n: usize) -> Scan {
    let (half_w, half_h) = (4.0_f32, 3.0_f32);
    let step = 2.0 * PI / n as f32;
    Scan::from_samples(
        (0..n)
            .map(|i| {
                let angle = -PI + i as f32 * step;
                let tx = half_w / angle.cos().abs().max(1e-6);
                let ty = half_h / angle.sin().abs().max(1e-6);
                Sample::new(angle, tx.min(ty))
            })
            .collect(),
    )
}

fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_into");
    let size = RasterSize::square(800);
    let config = ProjectionConfig::centered(800);

    for n in [400, 1000, 4000] {
        let scan = room_scan(n);
        let mut points = Vec::with_capacity(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &scan, |b, scan| {
            b.iter(|| {
                project_into(black_box(scan), &config, size, &mut points);
                black_box(points.len())
            })
        });
    }

    group.finish();
}

fn bench_render_cycle(c: &mut Criterion) {
    let size = RasterSize::square(800);
    let config = ProjectionConfig::centered(800);
    let mut compositor = FrameCompositor::new(size, FrameStyle::default(), config.origin_pixel());
    let scan = room_scan(400);
    let mut points = Vec::with_capacity(400);

    c.bench_function("render_cycle_800px", |b| {
        b.iter(|| {
            project_into(black_box(&scan), &config, size, &mut points);
            let frame = compositor.compose(&points);
            black_box(frame.width())
        })
    });
}

criterion_group!(benches, bench_project, bench_render_cycle);
criterion_main!(benches);
