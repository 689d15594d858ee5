use penumbra_geom::{Cell, Vec2};
use penumbra_lighting::{brightness, is_obstructed, march, march_from, shadow_factor};
use proptest::prelude::*;

fn arb_cell() -> impl Strategy<Value = Cell> {
    (-60i32..60, -60i32..60).prop_map(|(x, y)| Cell::new(x, y))
}

proptest! {
    // Marching visits exactly steps-1 cells, each one step further along the dominant axis
    #[test]
    fn march_length_and_adjacency(a in arb_cell(), b in arb_cell()) {
        let cells: Vec<Cell> = march(a, b).collect();
        let steps = a.chebyshev(b);
        prop_assert_eq!(cells.len() as i64, (steps - 1).max(0));
        let mut prev = a;
        for c in &cells {
            prop_assert_eq!(prev.chebyshev(*c), 1);
            prop_assert!(*c != a && *c != b);
            prev = *c;
        }
        if !cells.is_empty() {
            prop_assert_eq!(prev.chebyshev(b), 1);
        }
    }

    // Floor division makes the rasterized path independent of direction
    #[test]
    fn march_reversible(a in arb_cell(), b in arb_cell()) {
        let fwd: Vec<Cell> = march(a, b).collect();
        let mut back: Vec<Cell> = march(b, a).collect();
        back.reverse();
        prop_assert_eq!(fwd, back);
    }

    // A sample on the lattice marches exactly like its cell
    #[test]
    fn lattice_sample_march_matches_cell_march(a in arb_cell(), b in arb_cell()) {
        let from_cell: Vec<Cell> = march(a, b).collect();
        let from_sample: Vec<Cell> = march_from(a.as_vec2(), b).collect();
        prop_assert_eq!(from_cell, from_sample);
    }

    // Jittered marches leave the sample's cell and never land on the light
    #[test]
    fn sample_march_skips_endpoints(
        a in arb_cell(),
        b in arb_cell(),
        jx in 0.0f32..0.99,
        jy in 0.0f32..0.99,
    ) {
        let sample = a.as_vec2() + Vec2::new(jx, jy);
        for c in march_from(sample, b) {
            prop_assert!(c != a && c != b);
        }
    }

    // Every cell on the marched path blocks the ray
    #[test]
    fn path_cells_obstruct(a in arb_cell(), b in arb_cell()) {
        for c in march(a, b) {
            prop_assert!(is_obstructed(a, b, c));
        }
        prop_assert!(!is_obstructed(a, b, a));
        prop_assert!(!is_obstructed(a, b, b));
    }

    // Shadow factor stays within [0, 1] and is 1 without occluders
    #[test]
    fn shadow_factor_bounded(
        target in arb_cell(),
        light in arb_cell(),
        occ in prop::collection::vec(arb_cell(), 0..8),
        strength in 0.0f32..50.0,
    ) {
        let f = shadow_factor(target, light, &occ, strength);
        prop_assert!((0.0..=1.0).contains(&f));
        prop_assert_eq!(shadow_factor(target, light, &[], strength), 1.0);
    }

    // Brightness is non-increasing with distance and never exceeds the base intensity
    #[test]
    fn brightness_falls_off(d0 in 0.0f32..200.0, extra in 0.0f32..200.0, max in 0.0f32..1.0e6) {
        let near = brightness(d0, max, 1.0);
        let far = brightness(d0 + extra, max, 1.0);
        prop_assert!(far <= near);
        prop_assert!(near <= max);
    }
}
