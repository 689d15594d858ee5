use penumbra_geom::Cell;
use penumbra_lighting::IntensityField;
use penumbra_scene::Scene;

pub const SOLID_COLOR: [u8; 3] = [0, 0, 255];
pub const LIGHT_COLOR: [u8; 3] = [255, 255, 0];

const RAMP: &[u8] = b" .:-=+o%#@";

/// RGB frame buffer, one pixel per cell.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let idx = (y * self.width + x) * 3;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width + x) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

/// Grayscale broadcast of the field. Occluders take the solid marker colour;
/// point lights take the light marker when `mark_lights` is set.
pub fn composite(field: &IntensityField, scene: &Scene, mark_lights: bool) -> Frame {
    let mut frame = Frame::new(field.width(), field.height());
    for (y, row) in field.rows().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            frame.put_pixel(x, y, [v, v, v]);
        }
    }
    for &c in scene.occluders() {
        if let Some((x, y)) = pixel_of(field, c) {
            frame.put_pixel(x, y, SOLID_COLOR);
        }
    }
    if mark_lights {
        for l in scene.lights() {
            if let Some((x, y)) = pixel_of(field, l.cell) {
                frame.put_pixel(x, y, LIGHT_COLOR);
            }
        }
    }
    frame
}

fn pixel_of(field: &IntensityField, c: Cell) -> Option<(usize, usize)> {
    field.dims().contains(c).then(|| (c.x as usize, c.y as usize))
}

#[inline]
fn ramp_char(v: u8) -> char {
    RAMP[v as usize * RAMP.len() / 256] as char
}

/// Text rendering of a frame: brightness ramp, `X` occluders, `L` lights,
/// `S` sun, `F` flashlight.
pub fn ascii_preview(field: &IntensityField, scene: &Scene) -> String {
    let mut out = String::with_capacity((field.width() + 1) * field.height());
    for (y, row) in field.rows().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            let c = Cell::new(x as i32, y as i32);
            let ch = if scene.is_occluder(c) {
                'X'
            } else if scene.is_light(c) {
                'L'
            } else if scene.sun().is_some_and(|s| s.cell == c) {
                'S'
            } else if scene.flashlight().is_some_and(|f| f.cell == c) {
                'F'
            } else {
                ramp_char(v)
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
