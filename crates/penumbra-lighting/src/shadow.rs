use penumbra_geom::{Cell, Vec2};

use crate::occlusion::{is_obstructed, is_obstructed_from};

#[inline]
fn attenuation(distance: f32, shadow_strength: f32) -> f32 {
    (1.0 - shadow_strength / distance).max(0.0)
}

/// Attenuation of `light` as seen from `target`, in `[0, 1]`.
///
/// The first occluder on the marched path (from `target` to `light`) sets
/// the factor to `max(0, 1 - shadow_strength / distance)`; further occluders
/// do not compound it. An unobstructed path, or `target == light`, gives 1.
pub fn shadow_factor(target: Cell, light: Cell, occluders: &[Cell], shadow_strength: f32) -> f32 {
    if target == light {
        return 1.0;
    }
    match occluders.iter().find(|&&o| is_obstructed(target, light, o)) {
        Some(_) => attenuation(target.distance(light), shadow_strength),
        None => 1.0,
    }
}

/// [`shadow_factor`] for a jittered sub-cell sample. Both the marched path and
/// the distance start at `sample`, so samples in one cell can disagree about
/// an occluder that grazes the ray.
pub fn shadow_factor_from(
    sample: Vec2,
    light: Cell,
    occluders: &[Cell],
    shadow_strength: f32,
) -> f32 {
    let distance = sample.distance(light.as_vec2());
    if distance <= 0.0 {
        return 1.0;
    }
    match occluders.iter().find(|&&o| is_obstructed_from(sample, light, o)) {
        Some(_) => attenuation(distance, shadow_strength),
        None => 1.0,
    }
}
