use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use penumbra_geom::Cell;
use penumbra_lighting::{IntensityField, Jitter, LightingParams, compute_intensity_field};
use penumbra_scene::{Scene, SceneConfig, load_config_from_path};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::cli::Cli;
use crate::composite::{ascii_preview, composite};
use crate::tools::{PointerMap, ToolState};
use crate::watchers::spawn_config_watcher;

/// Headless stand-in for the interactive front end: owns the scene, applies
/// scripted placements and tool input, and drives the accumulator.
pub struct App {
    config_path: Option<PathBuf>,
    cfg: SceneConfig,
    lights: Vec<Cell>,
    solids: Vec<Cell>,
    pointer_px: Option<(i32, i32)>,
    samples_override: Option<u32>,
    seed_override: Option<u64>,
    tools: ToolState,
    scene: Scene,
    params: LightingParams,
    pool: Option<ThreadPool>,
    ascii: bool,
    frame: u64,
}

impl App {
    pub fn new(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let cfg = match &cli.config {
            Some(path) => {
                let cfg = load_config_from_path(path)?;
                log::info!("config loaded from {}", path.display());
                cfg
            }
            None => SceneConfig::default(),
        };
        let pool = match cli.threads {
            Some(n) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("penumbra-light-{i}"))
                    .build()?,
            ),
            None => None,
        };
        let mut tools = ToolState::default();
        if let Some(tool) = cli.tool {
            tools.select(tool);
        }
        if cli.escape {
            tools.clear();
        }
        let mut app = Self {
            config_path: cli.config.clone(),
            scene: Scene::empty(cfg.dims()),
            params: LightingParams::default(),
            cfg,
            lights: cli.lights.iter().map(|&p| Cell::from(p)).collect(),
            solids: cli.solids.iter().map(|&p| Cell::from(p)).collect(),
            pointer_px: cli.pointer,
            samples_override: cli.samples,
            seed_override: cli.seed,
            tools,
            pool,
            ascii: cli.ascii,
            frame: 0,
        };
        app.rebuild_scene();
        Ok(app)
    }

    fn pointer_map(&self) -> PointerMap {
        PointerMap {
            cell_px: self.cfg.grid.cell_px,
            ui_offset_px: self.cfg.grid.ui_offset_px,
            dims: self.cfg.dims(),
        }
    }

    fn pointer_cell(&self) -> Option<Cell> {
        let (px, py) = self.pointer_px?;
        self.pointer_map().to_cell(px, py)
    }

    /// The flashlight stays on the nearest edge cell while the pointer is off
    /// the grid.
    fn flashlight_cell(&self) -> Option<Cell> {
        let (px, py) = self.pointer_px?;
        self.pointer_map().to_cell_clamped(px, py)
    }

    fn lighting_params(&self) -> LightingParams {
        let samples = self.samples_override.unwrap_or(self.cfg.lighting.samples).max(1);
        let jitter = match self.seed_override.or(self.cfg.lighting.seed) {
            Some(seed) => Jitter::Seeded(seed),
            None => Jitter::Entropy,
        };
        LightingParams {
            shadow_strength: self.cfg.lighting.shadow_strength,
            samples,
            jitter,
        }
    }

    /// Scene from config, then command-line placements, then one click with
    /// the selected tool at the pointer.
    fn rebuild_scene(&mut self) {
        let mut scene = self.cfg.build_scene();
        for &c in &self.lights {
            let p = scene.add_light(c);
            if !p.is_placed() {
                log::warn!("--light {},{} skipped: {:?}", c.x, c.y, p);
            }
        }
        for &c in &self.solids {
            let p = scene.add_occluder(c);
            if !p.is_placed() {
                log::warn!("--solid {},{} skipped: {:?}", c.x, c.y, p);
            }
        }
        let pointer = self.pointer_cell();
        if self.pointer_px.is_some() && pointer.is_none() {
            log::warn!("pointer is outside the grid");
        }
        if let Some(p) = self.tools.click(&mut scene, pointer) {
            log::debug!("pointer click with {:?}: {:?}", self.tools.selected(), p);
        }
        let st = scene.stats();
        log::info!(
            "scene {}x{}: {} light(s), {} occluder(s), sun={}",
            scene.dims().width,
            scene.dims().height,
            st.lights,
            st.occluders,
            st.has_sun
        );
        self.scene = scene;
        self.params = self.lighting_params();
    }

    fn reload_config(&mut self) -> bool {
        let Some(path) = self.config_path.clone() else {
            return false;
        };
        if !path.exists() {
            log::warn!("config missing: {}", path.display());
            return false;
        }
        match load_config_from_path(&path) {
            Ok(cfg) => {
                self.cfg = cfg;
                self.rebuild_scene();
                log::info!("config reloaded from {}", path.display());
                true
            }
            Err(e) => {
                log::warn!("config reload failed ({}): {}", path.display(), e);
                false
            }
        }
    }

    /// One frame: flashlight follows the tool and pointer, then a full scan.
    pub fn step(&mut self) -> IntensityField {
        self.frame += 1;
        let pointer = self.flashlight_cell();
        self.tools.sync_flashlight(&mut self.scene, pointer);
        let t0 = Instant::now();
        let scene = &self.scene;
        let params = &self.params;
        let field = match &self.pool {
            Some(pool) => pool.install(|| compute_intensity_field(scene, params)),
            None => compute_intensity_field(scene, params),
        };
        let ms = t0.elapsed().as_secs_f32() * 1000.0;
        log::trace!(
            target: "frames",
            "[frame {}] flashlight={:?}",
            self.frame,
            self.scene.flashlight()
        );
        log::info!(
            target: "frames",
            "[frame {}] {:.2} ms, samples={}, max={}, mean={:.1}",
            self.frame,
            ms,
            self.params.samples,
            field.max(),
            field.mean()
        );
        field
    }

    fn present(&self, field: &IntensityField) {
        let frame = composite(field, &self.scene, true);
        log::debug!(
            "composited {}x{} frame ({} bytes)",
            frame.width,
            frame.height,
            frame.data.len()
        );
        if self.ascii {
            print!("{}", ascii_preview(field, &self.scene));
        }
    }

    pub fn run(&mut self, frames: u32, watch: bool) {
        let mut last = None;
        for _ in 0..frames.max(1) {
            last = Some(self.step());
        }
        if let Some(field) = &last {
            self.present(field);
        }
        if !watch {
            return;
        }
        let Some(path) = self.config_path.clone() else {
            return;
        };
        let rx = spawn_config_watcher(path);
        loop {
            match rx.recv_timeout(Duration::from_millis(250)) {
                Ok(()) => {
                    // Editors often emit several events per save.
                    while rx.try_recv().is_ok() {}
                    if self.reload_config() {
                        let field = self.step();
                        self.present(&field);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("config watcher stopped");
                    return;
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn scene(&self) -> &Scene {
        &self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use penumbra_geom::GridDims;
    use penumbra_lighting::compute_intensity_field_serial;
    use std::fs;

    fn app(args: &[&str]) -> App {
        let mut argv = vec!["penumbra"];
        argv.extend_from_slice(args);
        App::new(&Cli::parse_from(argv)).unwrap()
    }

    #[test]
    fn default_app_has_the_reference_sun() {
        let a = app(&[]);
        assert_eq!(a.scene().sun().unwrap().cell, Cell::new(79, 0));
        assert_eq!(a.params.samples, 1);
        assert_eq!(a.params.jitter, Jitter::Entropy);
    }

    #[test]
    fn placements_and_pointer_click_apply_in_order() {
        let a = app(&[
            "--light", "40,30", "--solid", "40,30", "--solid", "41,30", "--tool", "light",
            "--pointer", "105,55",
        ]);
        let s = a.scene();
        let cells: Vec<Cell> = s.lights().iter().map(|l| l.cell).collect();
        assert_eq!(cells, vec![Cell::new(40, 30), Cell::new(10, 5)]);
        assert_eq!(s.occluders(), &[Cell::new(41, 30)]);
    }

    #[test]
    fn flashlight_tool_tracks_pointer_each_frame() {
        let mut a = app(&["--tool", "flashlight", "--pointer", "15,25"]);
        assert!(a.scene().flashlight().is_none());
        let field = a.step();
        assert_eq!(a.scene().flashlight().map(|f| f.cell), Some(Cell::new(1, 2)));
        assert_eq!(field, compute_intensity_field_serial(a.scene(), &a.params));
    }

    #[test]
    fn flashlight_pins_to_the_edge_off_grid() {
        let mut a = app(&["--tool", "flashlight", "--pointer", "-30,25"]);
        a.step();
        assert_eq!(a.scene().flashlight().map(|f| f.cell), Some(Cell::new(0, 2)));
    }

    #[test]
    fn escape_drops_the_selected_tool() {
        let a = app(&["--tool", "light", "--escape", "--pointer", "105,55"]);
        assert!(a.scene().lights().is_empty());
        let mut a = app(&["--tool", "flashlight", "--escape", "--pointer", "15,25"]);
        a.step();
        assert!(a.scene().flashlight().is_none());
    }

    #[test]
    fn failed_reload_keeps_the_previous_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        fs::write(&path, "[scene]\nlights = [[3, 3]]\noccluders = [[4, 3]]\n").unwrap();
        let mut a = app(&["--config", path.to_str().unwrap(), "--solid", "9,9"]);
        let before = a.scene().stats();
        assert_eq!((before.lights, before.occluders), (1, 2));

        fs::write(&path, "[grid\nwidth = ").unwrap();
        assert!(!a.reload_config());
        assert_eq!(a.scene().stats(), before);

        fs::write(&path, "[grid]\nwidth = 0\n").unwrap();
        assert!(!a.reload_config());
        assert_eq!(a.scene().stats(), before);
        assert_eq!(a.scene().dims(), GridDims::new(80, 60));

        fs::remove_file(&path).unwrap();
        assert!(!a.reload_config());
        assert_eq!(a.scene().stats(), before);
        assert!(a.scene().is_occluder(Cell::new(9, 9)));
    }

    #[test]
    fn reload_reapplies_command_line_placements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        fs::write(&path, "[scene]\nlights = [[3, 3]]\n").unwrap();
        let cfg = path.to_str().unwrap();
        let mut a = app(&["--config", cfg, "--light", "20,20", "--solid", "21,20"]);
        assert_eq!(a.scene().lights().len(), 2);

        let rewritten = "[grid]\nwidth = 30\nheight = 30\n[lighting]\nsamples = 4\n\
                         [sun]\nenabled = false\n[scene]\noccluders = [[5, 5], [6, 5]]\n";
        fs::write(&path, rewritten).unwrap();
        assert!(a.reload_config());

        let s = a.scene();
        assert_eq!(s.dims(), GridDims::new(30, 30));
        assert!(s.sun().is_none());
        let lights: Vec<Cell> = s.lights().iter().map(|l| l.cell).collect();
        assert_eq!(lights, vec![Cell::new(20, 20)]);
        assert_eq!(s.occluders(), &[Cell::new(5, 5), Cell::new(6, 5), Cell::new(21, 20)]);
        assert_eq!(a.params.samples, 4);
    }

    #[test]
    fn demo_scene_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/scene.toml");
        let a = app(&["--config", path]);
        let st = a.scene().stats();
        assert_eq!((st.lights, st.occluders, st.has_sun), (2, 30, true));
        assert!(!a.scene().is_occupied(Cell::new(20, 31)));
    }

    #[test]
    fn overrides_beat_config() {
        let mut a = app(&["--samples", "6", "--seed", "9", "--threads", "2"]);
        assert_eq!(a.params.samples, 6);
        assert_eq!(a.params.jitter, Jitter::Seeded(9));
        let pooled = a.step();
        assert_eq!(pooled, compute_intensity_field_serial(a.scene(), &a.params));
    }
}
