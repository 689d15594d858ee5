//! Direct lighting over a 2D cell grid with point occluders.
//!
//! Every cell sums inverse-square contributions from the scene's point lights,
//! the sun and the flashlight. A light whose marched path to the cell crosses
//! an occluder is attenuated by a shadow factor that softens with distance.
//! The result is clamped into a one-byte display range.
#![forbid(unsafe_code)]

mod accumulate;
mod field;
mod jitter;
pub mod occlusion;
pub mod radiometric;
pub mod shadow;

pub use accumulate::{
    DISPLAY_MAX, SUPERSAMPLE_NORMALIZATION, cell_radiance, compute_intensity_field,
    compute_intensity_field_serial, point_light_radiance, supersampled_radiance, to_display,
};
pub use field::IntensityField;
pub use jitter::Jitter;
pub use occlusion::{March, SampleMarch, is_obstructed, is_obstructed_from, march, march_from};
pub use radiometric::{brightness, brightness_unshadowed};
pub use shadow::{shadow_factor, shadow_factor_from};

pub const DEFAULT_SHADOW_STRENGTH: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingParams {
    /// Numerator of the shadow falloff `1 - shadow_strength / distance`.
    pub shadow_strength: f32,
    /// Jittered point-light samples per cell. Values below 2 use the exact path.
    pub samples: u32,
    pub jitter: Jitter,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            shadow_strength: DEFAULT_SHADOW_STRENGTH,
            samples: 1,
            jitter: Jitter::Entropy,
        }
    }
}

impl LightingParams {
    #[inline]
    pub fn supersampled(&self) -> bool {
        self.samples >= 2
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }
}
