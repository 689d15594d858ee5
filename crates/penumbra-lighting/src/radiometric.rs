/// Inverse-square falloff: `max_intensity * shadow_factor / (distance^2 + 1)`.
///
/// The `+ 1` keeps a light's own cell finite (`distance == 0` yields
/// `max_intensity * shadow_factor`).
#[inline]
pub fn brightness(distance: f32, max_intensity: f32, shadow_factor: f32) -> f32 {
    max_intensity * shadow_factor / (distance * distance + 1.0)
}

#[inline]
pub fn brightness_unshadowed(distance: f32, max_intensity: f32) -> f32 {
    brightness(distance, max_intensity, 1.0)
}
