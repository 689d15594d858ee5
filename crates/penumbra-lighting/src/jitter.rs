use penumbra_geom::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source for supersample offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Jitter {
    /// Fresh OS entropy for every row of every frame.
    #[default]
    Entropy,
    /// Deterministic offsets. Each row derives its own stream from the seed so
    /// the result does not depend on how rows are scheduled across threads.
    Seeded(u64),
}

impl Jitter {
    pub fn row_rng(self, row: usize) -> StdRng {
        match self {
            Jitter::Entropy => StdRng::from_entropy(),
            Jitter::Seeded(seed) => {
                StdRng::seed_from_u64(seed ^ (row as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
            }
        }
    }
}

/// Uniform offset inside the unit cell, `[0, 1) x [0, 1)`.
#[inline]
pub fn unit_offset<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0))
}
