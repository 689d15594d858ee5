use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use penumbra_geom::{Cell, GridDims};
use penumbra_lighting::{
    Jitter, LightingParams, compute_intensity_field, compute_intensity_field_serial,
};
use penumbra_scene::Scene;

fn reference_scene(occluders: usize) -> Scene {
    let mut scene = Scene::new(GridDims::new(80, 60));
    for (x, y) in [(20, 15), (40, 30), (60, 45)] {
        let _ = scene.add_light(Cell::new(x, y));
    }
    for i in 0..occluders as i32 {
        let _ = scene.add_occluder(Cell::new(10 + i % 60, 20 + (i / 60) * 7));
    }
    scene.set_flashlight(Some(Cell::new(5, 55)));
    scene
}

fn bench_exact(c: &mut Criterion) {
    let mut group = c.benchmark_group("intensity_field_exact");
    let params = LightingParams::default();
    for occ in [0usize, 60, 240] {
        let scene = reference_scene(occ);
        group.bench_function(format!("parallel_80x60_occ{occ}"), |b| {
            b.iter(|| black_box(compute_intensity_field(&scene, &params)))
        });
        group.bench_function(format!("serial_80x60_occ{occ}"), |b| {
            b.iter(|| black_box(compute_intensity_field_serial(&scene, &params)))
        });
    }
    group.finish();
}

fn bench_supersampled(c: &mut Criterion) {
    let mut group = c.benchmark_group("intensity_field_supersampled");
    group.measurement_time(Duration::from_secs(10));
    let scene = reference_scene(60);
    for n in [4u32, 16] {
        let params = LightingParams::default()
            .with_samples(n)
            .with_jitter(Jitter::Seeded(7));
        group.bench_function(format!("samples{n}_80x60"), |b| {
            b.iter(|| black_box(compute_intensity_field(&scene, &params)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_exact, bench_supersampled);
criterion_main!(benches);
