use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use penumbra_geom::{Cell, GridDims};

use crate::{DEFAULT_LIGHT_INTENSITY, DEFAULT_SUN_INTENSITY, LightSource, Scene};

/// Largest accepted grid, in cells. Every cell is rescanned each frame.
pub const MAX_GRID_CELLS: usize = 1 << 24;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub grid: Grid,
    #[serde(default)]
    pub lighting: Lighting,
    #[serde(default)]
    pub sun: Sun,
    #[serde(default)]
    pub scene: Placements,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Grid {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    /// Size of one cell on screen, in pixels.
    #[serde(default = "default_cell_px")]
    pub cell_px: u32,
    /// Horizontal pixel offset of the grid (width of a left-hand tool strip).
    #[serde(default)]
    pub ui_offset_px: u32,
}
fn default_width() -> usize {
    80
}
fn default_height() -> usize {
    60
}
fn default_cell_px() -> u32 {
    10
}
impl Default for Grid {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            cell_px: default_cell_px(),
            ui_offset_px: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Lighting {
    #[serde(default = "default_light_intensity")]
    pub light_intensity: f32,
    #[serde(default = "default_shadow_strength")]
    pub shadow_strength: f32,
    /// Jittered samples per cell for point lights; 1 disables supersampling.
    #[serde(default = "default_samples")]
    pub samples: u32,
    /// Fixed jitter seed. Absent means a fresh random source every frame.
    #[serde(default)]
    pub seed: Option<u64>,
}
fn default_light_intensity() -> f32 {
    DEFAULT_LIGHT_INTENSITY
}
fn default_shadow_strength() -> f32 {
    10.0
}
fn default_samples() -> u32 {
    1
}
impl Default for Lighting {
    fn default() -> Self {
        Self {
            light_intensity: default_light_intensity(),
            shadow_strength: default_shadow_strength(),
            samples: default_samples(),
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Sun {
    #[serde(default = "default_sun_enabled")]
    pub enabled: bool,
    /// Defaults to the right-most column.
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: i32,
    #[serde(default = "default_sun_intensity")]
    pub intensity: f32,
}
fn default_sun_enabled() -> bool {
    true
}
fn default_sun_intensity() -> f32 {
    DEFAULT_SUN_INTENSITY
}
impl Default for Sun {
    fn default() -> Self {
        Self {
            enabled: true,
            x: None,
            y: 0,
            intensity: default_sun_intensity(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Placements {
    #[serde(default)]
    pub lights: Vec<[i32; 2]>,
    #[serde(default)]
    pub occluders: Vec<[i32; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyGrid,
    GridTooLarge { width: usize, height: usize },
    ZeroCellSize,
    NegativeIntensity(&'static str),
    NegativeShadowStrength,
    ZeroSamples,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyGrid => write!(f, "grid width and height must be non-zero"),
            ConfigError::GridTooLarge { width, height } => write!(
                f,
                "grid {}x{} exceeds the {} cell limit",
                width, height, MAX_GRID_CELLS
            ),
            ConfigError::ZeroCellSize => write!(f, "grid.cell_px must be non-zero"),
            ConfigError::NegativeIntensity(what) => {
                write!(f, "{} intensity must be finite and non-negative", what)
            }
            ConfigError::NegativeShadowStrength => {
                write!(f, "lighting.shadow_strength must be finite and non-negative")
            }
            ConfigError::ZeroSamples => write!(f, "lighting.samples must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

fn non_negative(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

impl SceneConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: SceneConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let (width, height) = (self.grid.width, self.grid.height);
        if width.checked_mul(height).is_none_or(|n| n > MAX_GRID_CELLS) {
            return Err(ConfigError::GridTooLarge { width, height });
        }
        if self.grid.cell_px == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if !non_negative(self.lighting.light_intensity) {
            return Err(ConfigError::NegativeIntensity("lighting.light"));
        }
        if !non_negative(self.sun.intensity) {
            return Err(ConfigError::NegativeIntensity("sun"));
        }
        if !non_negative(self.lighting.shadow_strength) {
            return Err(ConfigError::NegativeShadowStrength);
        }
        if self.lighting.samples == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        Ok(())
    }

    #[inline]
    pub fn dims(&self) -> GridDims {
        GridDims::new(self.grid.width, self.grid.height)
    }

    /// Build the initial scene. Placements that collide or fall off the grid
    /// are skipped with a warning.
    pub fn build_scene(&self) -> Scene {
        let dims = self.dims();
        let mut scene = Scene::empty(dims).with_light_intensity(self.lighting.light_intensity);
        if self.sun.enabled {
            let x = self.sun.x.unwrap_or(dims.width as i32 - 1);
            scene = scene.with_sun(LightSource::new(Cell::new(x, self.sun.y), self.sun.intensity));
        }
        for &[x, y] in &self.scene.lights {
            let p = scene.add_light(Cell::new(x, y));
            if !p.is_placed() {
                log::warn!("config light ({}, {}) skipped: {:?}", x, y, p);
            }
        }
        for &[x, y] in &self.scene.occluders {
            let p = scene.add_occluder(Cell::new(x, y));
            if !p.is_placed() {
                log::warn!("config occluder ({}, {}) skipped: {:?}", x, y, p);
            }
        }
        scene
    }
}

pub fn load_config_from_path(path: &Path) -> Result<SceneConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    SceneConfig::from_toml_str(&s)
}
