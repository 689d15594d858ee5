use penumbra_geom::{Cell, GridDims};

/// One frame of display intensities, row-major, one byte per cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntensityField {
    dims: GridDims,
    data: Vec<u8>,
}

impl IntensityField {
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            data: vec![0; dims.len()],
        }
    }

    pub(crate) fn from_raw(dims: GridDims, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), dims.len());
        Self { dims, data }
    }

    #[inline]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dims.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dims.height
    }

    #[inline]
    pub fn get(&self, c: Cell) -> Option<u8> {
        self.dims.index(c).map(|i| self.data[i])
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks() panics on a zero chunk size
        self.data.chunks(self.dims.width.max(1))
    }

    pub fn max(&self) -> u8 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.data.iter().map(|&v| v as u64).sum();
        sum as f32 / self.data.len() as f32
    }
}
