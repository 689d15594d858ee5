//! Scene state: light sources, occluders, the sun and the transient flashlight.
#![forbid(unsafe_code)]

pub mod config;

use hashbrown::HashSet;
use penumbra_geom::{Cell, GridDims};

pub use config::{ConfigError, MAX_GRID_CELLS, SceneConfig, load_config_from_path};

/// Base intensity of a user-placed point light and of the flashlight.
pub const DEFAULT_LIGHT_INTENSITY: f32 = 10_000.0;
/// Base intensity of the sun.
pub const DEFAULT_SUN_INTENSITY: f32 = 300_000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub cell: Cell,
    pub intensity: f32,
}

impl LightSource {
    #[inline]
    pub const fn new(cell: Cell, intensity: f32) -> Self {
        Self { cell, intensity }
    }
}

/// Outcome of a placement request. Rejections leave the scene untouched.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Placed,
    /// The cell already holds a light, an occluder or the sun.
    Occupied,
    OutOfBounds,
}

impl Placement {
    #[inline]
    pub fn is_placed(self) -> bool {
        matches!(self, Placement::Placed)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStats {
    pub lights: usize,
    pub occluders: usize,
    pub has_sun: bool,
    pub has_flashlight: bool,
}

/// Mutable scene owned by the front end and borrowed read-only by the accumulator.
///
/// Lights and occluders keep insertion order for iteration; the hash sets only
/// answer membership queries.
#[derive(Clone, Debug)]
pub struct Scene {
    dims: GridDims,
    light_intensity: f32,
    lights: Vec<LightSource>,
    occluders: Vec<Cell>,
    light_cells: HashSet<Cell>,
    occluder_cells: HashSet<Cell>,
    sun: Option<LightSource>,
    flashlight: Option<LightSource>,
}

impl Scene {
    /// Default scene: no lights or occluders, sun at the top-right edge cell.
    pub fn new(dims: GridDims) -> Self {
        let sun_cell = Cell::new(dims.width as i32 - 1, 0);
        Self::empty(dims).with_sun(LightSource::new(sun_cell, DEFAULT_SUN_INTENSITY))
    }

    /// Scene without a sun; nothing illuminates it until lights are added.
    pub fn empty(dims: GridDims) -> Self {
        Self {
            dims,
            light_intensity: DEFAULT_LIGHT_INTENSITY,
            lights: Vec::new(),
            occluders: Vec::new(),
            light_cells: HashSet::new(),
            occluder_cells: HashSet::new(),
            sun: None,
            flashlight: None,
        }
    }

    /// Install the sun. Its cell is clamped onto the grid; any light or
    /// occluder already on that cell is displaced.
    pub fn with_sun(mut self, sun: LightSource) -> Self {
        let Some(cell) = self.dims.clamp(sun.cell) else {
            log::warn!("sun ignored: grid {}x{} is empty", self.dims.width, self.dims.height);
            return self;
        };
        if cell != sun.cell {
            log::warn!(
                "sun ({}, {}) outside grid; clamped to ({}, {})",
                sun.cell.x,
                sun.cell.y,
                cell.x,
                cell.y
            );
        }
        self.remove_at(cell);
        self.sun = Some(LightSource::new(cell, sun.intensity));
        self
    }

    /// Intensity used by `add_light` and by the flashlight.
    pub fn with_light_intensity(mut self, intensity: f32) -> Self {
        self.light_intensity = intensity;
        if let Some(f) = self.flashlight.as_mut() {
            f.intensity = intensity;
        }
        self
    }

    #[inline]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    #[inline]
    pub fn light_intensity(&self) -> f32 {
        self.light_intensity
    }

    #[inline]
    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    #[inline]
    pub fn occluders(&self) -> &[Cell] {
        &self.occluders
    }

    #[inline]
    pub fn sun(&self) -> Option<LightSource> {
        self.sun
    }

    #[inline]
    pub fn flashlight(&self) -> Option<LightSource> {
        self.flashlight
    }

    #[inline]
    pub fn is_occluder(&self, c: Cell) -> bool {
        self.occluder_cells.contains(&c)
    }

    #[inline]
    pub fn is_light(&self, c: Cell) -> bool {
        self.light_cells.contains(&c)
    }

    /// True when the cell holds a point light, an occluder or the sun.
    pub fn is_occupied(&self, c: Cell) -> bool {
        self.is_light(c) || self.is_occluder(c) || self.sun.is_some_and(|s| s.cell == c)
    }

    fn check_placement(&self, c: Cell) -> Placement {
        if !self.dims.contains(c) {
            return Placement::OutOfBounds;
        }
        if self.is_occupied(c) {
            return Placement::Occupied;
        }
        Placement::Placed
    }

    pub fn add_light(&mut self, c: Cell) -> Placement {
        self.add_light_with_intensity(c, self.light_intensity)
    }

    pub fn add_light_with_intensity(&mut self, c: Cell, intensity: f32) -> Placement {
        let p = self.check_placement(c);
        if p.is_placed() {
            self.lights.push(LightSource::new(c, intensity));
            self.light_cells.insert(c);
        } else {
            log::debug!("light at ({}, {}) rejected: {:?}", c.x, c.y, p);
        }
        p
    }

    pub fn add_occluder(&mut self, c: Cell) -> Placement {
        let p = self.check_placement(c);
        if p.is_placed() {
            self.occluders.push(c);
            self.occluder_cells.insert(c);
        } else {
            log::debug!("occluder at ({}, {}) rejected: {:?}", c.x, c.y, p);
        }
        p
    }

    /// Remove the point light or occluder at `c`. The sun cannot be removed.
    pub fn remove_at(&mut self, c: Cell) -> bool {
        if self.light_cells.remove(&c) {
            self.lights.retain(|l| l.cell != c);
            return true;
        }
        if self.occluder_cells.remove(&c) {
            self.occluders.retain(|o| *o != c);
            return true;
        }
        false
    }

    /// Replace the flashlight. `None` or an off-grid cell leaves no flashlight.
    /// Returns whether a flashlight is present afterwards.
    pub fn set_flashlight(&mut self, at: Option<Cell>) -> bool {
        self.flashlight = match at {
            Some(c) if self.dims.contains(c) => Some(LightSource::new(c, self.light_intensity)),
            Some(c) => {
                log::debug!("flashlight at ({}, {}) outside grid; cleared", c.x, c.y);
                None
            }
            None => None,
        };
        self.flashlight.is_some()
    }

    /// Remove every point light, occluder and the flashlight. The sun stays.
    pub fn clear(&mut self) {
        self.lights.clear();
        self.occluders.clear();
        self.light_cells.clear();
        self.occluder_cells.clear();
        self.flashlight = None;
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            lights: self.lights.len(),
            occluders: self.occluders.len(),
            has_sun: self.sun.is_some(),
            has_flashlight: self.flashlight.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> GridDims {
        GridDims::new(80, 60)
    }

    #[test]
    fn default_scene_has_sun_in_top_right() {
        let s = Scene::new(dims());
        let sun = s.sun().unwrap();
        assert_eq!(sun.cell, Cell::new(79, 0));
        assert_eq!(sun.intensity, DEFAULT_SUN_INTENSITY);
        assert!(s.lights().is_empty());
        assert!(s.occluders().is_empty());
    }

    #[test]
    fn light_then_occluder_on_same_cell_is_rejected() {
        let mut s = Scene::empty(dims());
        assert_eq!(s.add_light(Cell::new(3, 4)), Placement::Placed);
        assert_eq!(s.add_occluder(Cell::new(3, 4)), Placement::Occupied);
        assert!(s.occluders().is_empty());
        assert_eq!(s.add_light(Cell::new(3, 4)), Placement::Occupied);
        assert_eq!(s.lights().len(), 1);
    }

    #[test]
    fn occluder_then_light_on_same_cell_is_rejected() {
        let mut s = Scene::empty(dims());
        assert!(s.add_occluder(Cell::new(10, 10)).is_placed());
        assert_eq!(s.add_light(Cell::new(10, 10)), Placement::Occupied);
        assert!(s.lights().is_empty());
    }

    #[test]
    fn sun_cell_counts_as_occupied() {
        let mut s = Scene::new(dims());
        assert_eq!(s.add_occluder(Cell::new(79, 0)), Placement::Occupied);
        assert_eq!(s.add_light(Cell::new(79, 0)), Placement::Occupied);
        assert!(!s.remove_at(Cell::new(79, 0)));
        assert!(s.sun().is_some());
    }

    #[test]
    fn out_of_bounds_placements_are_rejected() {
        let mut s = Scene::empty(dims());
        assert_eq!(s.add_light(Cell::new(80, 0)), Placement::OutOfBounds);
        assert_eq!(s.add_occluder(Cell::new(0, -1)), Placement::OutOfBounds);
        assert_eq!(s.stats(), SceneStats::default());
    }

    #[test]
    fn remove_keeps_insertion_order_of_the_rest() {
        let mut s = Scene::empty(dims());
        for x in 0..4 {
            assert!(s.add_occluder(Cell::new(x, 1)).is_placed());
        }
        assert!(s.remove_at(Cell::new(1, 1)));
        assert_eq!(s.occluders(), &[Cell::new(0, 1), Cell::new(2, 1), Cell::new(3, 1)]);
        assert!(!s.is_occluder(Cell::new(1, 1)));
        // Freed cell can be reused.
        assert!(s.add_light(Cell::new(1, 1)).is_placed());
    }

    #[test]
    fn flashlight_is_optional_and_bounds_checked() {
        let mut s = Scene::empty(dims()).with_light_intensity(500.0);
        assert!(s.flashlight().is_none());
        assert!(s.set_flashlight(Some(Cell::ORIGIN)));
        assert_eq!(s.flashlight(), Some(LightSource::new(Cell::ORIGIN, 500.0)));
        assert!(!s.set_flashlight(Some(Cell::new(-1, 5))));
        assert!(s.flashlight().is_none());
        s.set_flashlight(Some(Cell::new(2, 2)));
        assert!(!s.set_flashlight(None));
    }

    #[test]
    fn flashlight_may_share_a_cell_with_an_occluder() {
        let mut s = Scene::empty(dims());
        assert!(s.add_occluder(Cell::new(5, 5)).is_placed());
        assert!(s.set_flashlight(Some(Cell::new(5, 5))));
    }

    #[test]
    fn sun_outside_grid_is_clamped_and_displaces_occupant() {
        let s = Scene::empty(dims()).with_sun(LightSource::new(Cell::new(200, -3), 1.0));
        assert_eq!(s.sun().unwrap().cell, Cell::new(79, 0));

        let mut s = Scene::empty(dims());
        assert!(s.add_occluder(Cell::new(40, 0)).is_placed());
        let s = s.with_sun(LightSource::new(Cell::new(40, 0), 2.0));
        assert!(s.occluders().is_empty());
        assert_eq!(s.sun().unwrap().cell, Cell::new(40, 0));
    }

    #[test]
    fn clear_keeps_the_sun() {
        let mut s = Scene::new(dims());
        assert!(s.add_light(Cell::new(1, 1)).is_placed());
        assert!(s.add_occluder(Cell::new(2, 2)).is_placed());
        s.set_flashlight(Some(Cell::new(3, 3)));
        s.clear();
        let st = s.stats();
        assert_eq!((st.lights, st.occluders, st.has_sun, st.has_flashlight), (0, 0, true, false));
    }
}
