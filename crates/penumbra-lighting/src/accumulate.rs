use penumbra_geom::{Cell, Vec2};
use penumbra_scene::{LightSource, Scene};
use rand::Rng;
use rayon::prelude::*;

use crate::field::IntensityField;
use crate::jitter::unit_offset;
use crate::radiometric::brightness;
use crate::shadow::{shadow_factor, shadow_factor_from};
use crate::LightingParams;

/// Divisor applied to a supersampled cell total. It keeps the averaged point
/// lights, the sun and the flashlight on the same display scale as the exact
/// path was tuned for.
pub const SUPERSAMPLE_NORMALIZATION: f32 = 3.0;

/// Upper end of the display range.
pub const DISPLAY_MAX: u8 = 255;

/// Truncate toward zero and clamp into `[0, DISPLAY_MAX]`.
#[inline]
pub fn to_display(radiance: f32) -> u8 {
    // `as` saturates and maps NaN to 0.
    radiance.trunc().clamp(0.0, DISPLAY_MAX as f32) as u8
}

#[inline]
fn contribution(cell: Cell, light: &LightSource, occluders: &[Cell], shadow_strength: f32) -> f32 {
    let d = cell.distance(light.cell);
    let sf = shadow_factor(cell, light.cell, occluders, shadow_strength);
    brightness(d, light.intensity, sf)
}

#[inline]
fn sampled_contribution(
    sample: Vec2,
    light: &LightSource,
    occluders: &[Cell],
    shadow_strength: f32,
) -> f32 {
    let d = sample.distance(light.cell.as_vec2());
    let sf = shadow_factor_from(sample, light.cell, occluders, shadow_strength);
    brightness(d, light.intensity, sf)
}

/// Summed contribution of the user-placed point lights at the exact cell.
pub fn point_light_radiance(scene: &Scene, params: &LightingParams, cell: Cell) -> f32 {
    let occ = scene.occluders();
    scene
        .lights()
        .iter()
        .map(|l| contribution(cell, l, occ, params.shadow_strength))
        .sum()
}

/// Sun plus flashlight, whichever are present. Never jittered.
fn fixed_radiance(scene: &Scene, params: &LightingParams, cell: Cell) -> f32 {
    let occ = scene.occluders();
    scene
        .sun()
        .iter()
        .chain(scene.flashlight().iter())
        .map(|l| contribution(cell, l, occ, params.shadow_strength))
        .sum()
}

/// Unclamped total at `cell` on the exact (non-supersampled) path.
pub fn cell_radiance(scene: &Scene, params: &LightingParams, cell: Cell) -> f32 {
    point_light_radiance(scene, params, cell) + fixed_radiance(scene, params, cell)
}

/// Unclamped supersampled total at `cell`.
///
/// Point lights are averaged over `params.samples` jittered positions inside
/// the cell, each with its own distance and occlusion march. Sun and
/// flashlight are added at the exact cell and the sum is divided by
/// [`SUPERSAMPLE_NORMALIZATION`]. With fewer than two samples this is
/// [`cell_radiance`].
pub fn supersampled_radiance<R: Rng + ?Sized>(
    scene: &Scene,
    params: &LightingParams,
    cell: Cell,
    rng: &mut R,
) -> f32 {
    if !params.supersampled() {
        return cell_radiance(scene, params, cell);
    }
    let occ = scene.occluders();
    let origin = cell.as_vec2();
    let n = params.samples;
    let mut acc = 0.0f32;
    for _ in 0..n {
        let sample = origin + unit_offset(rng);
        acc += scene
            .lights()
            .iter()
            .map(|l| sampled_contribution(sample, l, occ, params.shadow_strength))
            .sum::<f32>();
    }
    (acc / n as f32 + fixed_radiance(scene, params, cell)) / SUPERSAMPLE_NORMALIZATION
}

fn shade_row(scene: &Scene, params: &LightingParams, y: usize, row: &mut [u8]) {
    if params.supersampled() {
        let mut rng = params.jitter.row_rng(y);
        for (x, out) in row.iter_mut().enumerate() {
            let c = Cell::new(x as i32, y as i32);
            *out = to_display(supersampled_radiance(scene, params, c, &mut rng));
        }
    } else {
        for (x, out) in row.iter_mut().enumerate() {
            let c = Cell::new(x as i32, y as i32);
            *out = to_display(cell_radiance(scene, params, c));
        }
    }
}

/// Full-grid scan, rows spread across the current rayon pool.
///
/// The scene is only borrowed, so it cannot change while the scan runs, and
/// every row is written before this returns.
pub fn compute_intensity_field(scene: &Scene, params: &LightingParams) -> IntensityField {
    let dims = scene.dims();
    log::trace!(
        "scan {}x{}: {} light(s), {} occluder(s), samples={}",
        dims.width,
        dims.height,
        scene.lights().len(),
        scene.occluders().len(),
        params.samples
    );
    let mut data = vec![0u8; dims.len()];
    if !dims.is_empty() {
        data.par_chunks_mut(dims.width)
            .enumerate()
            .for_each(|(y, row)| shade_row(scene, params, y, row));
    }
    IntensityField::from_raw(dims, data)
}

/// Single-threaded reference scan. Matches [`compute_intensity_field`] exactly
/// on the exact path and for seeded jitter.
pub fn compute_intensity_field_serial(scene: &Scene, params: &LightingParams) -> IntensityField {
    let dims = scene.dims();
    let mut data = vec![0u8; dims.len()];
    if !dims.is_empty() {
        for (y, row) in data.chunks_mut(dims.width).enumerate() {
            shade_row(scene, params, y, row);
        }
    }
    IntensityField::from_raw(dims, data)
}
