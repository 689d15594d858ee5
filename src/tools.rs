use clap::ValueEnum;
use penumbra_geom::{Cell, GridDims};
use penumbra_scene::{Placement, Scene};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Tool {
    Light,
    Solid,
    Flashlight,
}

/// Currently selected tool. Selecting the active tool again deselects it.
#[derive(Default, Debug, Clone)]
pub struct ToolState {
    selected: Option<Tool>,
}

impl ToolState {
    #[inline]
    pub fn selected(&self) -> Option<Tool> {
        self.selected
    }

    pub fn select(&mut self, tool: Tool) {
        self.selected = if self.selected == Some(tool) { None } else { Some(tool) };
        log::debug!("tool selection: {:?}", self.selected);
    }

    /// Escape: drop the selection.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Apply the selected tool at a grid cell. `None` when nothing happened
    /// (no tool, pointer off the grid, or the flashlight tool, which only
    /// follows the pointer).
    pub fn click(&self, scene: &mut Scene, at: Option<Cell>) -> Option<Placement> {
        let c = at?;
        match self.selected? {
            Tool::Light => Some(scene.add_light(c)),
            Tool::Solid => Some(scene.add_occluder(c)),
            Tool::Flashlight => None,
        }
    }

    /// Per-frame: the flashlight exists only while its tool is selected and
    /// sits under the pointer.
    pub fn sync_flashlight(&self, scene: &mut Scene, pointer: Option<Cell>) {
        let at = match self.selected {
            Some(Tool::Flashlight) => pointer,
            _ => None,
        };
        scene.set_flashlight(at);
    }
}

/// Maps window pixels to grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerMap {
    pub cell_px: u32,
    pub ui_offset_px: u32,
    pub dims: GridDims,
}

impl PointerMap {
    fn raw_cell(&self, px: i32, py: i32) -> Cell {
        let size = i32::try_from(self.cell_px.max(1)).unwrap_or(i32::MAX);
        let offset = i32::try_from(self.ui_offset_px).unwrap_or(i32::MAX);
        Cell::new(px.saturating_sub(offset).div_euclid(size), py.div_euclid(size))
    }

    /// Cell under the pointer, or `None` when the pointer is off the grid.
    pub fn to_cell(&self, px: i32, py: i32) -> Option<Cell> {
        let c = self.raw_cell(px, py);
        self.dims.contains(c).then_some(c)
    }

    /// Cell under the pointer, pinned to the nearest edge cell when off the grid.
    pub fn to_cell_clamped(&self, px: i32, py: i32) -> Option<Cell> {
        self.dims.clamp(self.raw_cell(px, py))
    }
}
