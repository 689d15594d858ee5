use penumbra_geom::{Cell, Vec2};

/// Interior cells of the rasterized segment `start -> end`.
///
/// Step `t` in `1..steps` lands on `start + floor(d * t / steps)` per axis,
/// with `steps` the Chebyshev length. Division floors (rounds toward negative
/// infinity) for both signs of the delta, which makes `a -> b` and `b -> a`
/// visit the same cells. Truncating division would not. Both endpoints are
/// excluded.
#[derive(Clone, Debug)]
pub struct March {
    start: Cell,
    dx: i64,
    dy: i64,
    steps: i64,
    t: i64,
}

impl Iterator for March {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.t >= self.steps {
            return None;
        }
        let t = self.t;
        self.t += 1;
        let x = self.start.x as i64 + (self.dx * t).div_euclid(self.steps);
        let y = self.start.y as i64 + (self.dy * t).div_euclid(self.steps);
        Some(Cell::new(x as i32, y as i32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.steps - self.t).max(0) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for March {}

#[inline]
pub fn march(start: Cell, end: Cell) -> March {
    March {
        start,
        dx: (end.x - start.x) as i64,
        dy: (end.y - start.y) as i64,
        steps: start.chebyshev(end),
        t: 1,
    }
}

/// Whether the marched segment passes through `occluder`.
/// Coincident endpoints are never obstructed.
#[inline]
pub fn is_obstructed(start: Cell, end: Cell, occluder: Cell) -> bool {
    march(start, end).any(|c| c == occluder)
}

/// Interior cells of the segment from a sub-cell sample point to `end`.
///
/// Same stepping as [`March`] with the start moved off the lattice: step `t`
/// lands on `floor(sample + (end - sample) * t / steps)`, `steps` being the
/// Chebyshev length from the sample's cell. A sample sitting exactly on a
/// cell coordinate visits the same cells as [`march`].
#[derive(Clone, Debug)]
pub struct SampleMarch {
    sx: f64,
    sy: f64,
    dx: f64,
    dy: f64,
    steps: i64,
    t: i64,
}

impl Iterator for SampleMarch {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.t >= self.steps {
            return None;
        }
        let t = self.t as f64;
        let n = self.steps as f64;
        self.t += 1;
        let x = (self.sx + self.dx * t / n).floor();
        let y = (self.sy + self.dy * t / n).floor();
        Some(Cell::new(x as i32, y as i32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.steps - self.t).max(0) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SampleMarch {}

#[inline]
pub fn march_from(sample: Vec2, end: Cell) -> SampleMarch {
    let (sx, sy) = (sample.x as f64, sample.y as f64);
    SampleMarch {
        sx,
        sy,
        dx: end.x as f64 - sx,
        dy: end.y as f64 - sy,
        steps: sample.cell().chebyshev(end),
        t: 1,
    }
}

/// [`is_obstructed`] for a ray leaving a jittered sample point.
#[inline]
pub fn is_obstructed_from(sample: Vec2, end: Cell, occluder: Cell) -> bool {
    march_from(sample, end).any(|c| c == occluder)
}
