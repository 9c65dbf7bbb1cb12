//! Shared helpers for integration tests

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smoke_sim_core::obstacles::is_solid;
use smoke_sim_core::{GridDimensions, VolumetricField};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Visit every cell of `dims` in storage order
pub fn cells(dims: GridDimensions) -> impl Iterator<Item = (usize, usize, usize)> {
    (0..dims.depth).flat_map(move |z| {
        (0..dims.height).flat_map(move |y| (0..dims.width).map(move |x| (x, y, z)))
    })
}

/// Whether `(x, y, z)` is open fluid in `obstacles`
pub fn is_fluid(obstacles: &VolumetricField, x: usize, y: usize, z: usize) -> bool {
    !is_solid(obstacles, x as isize, y as isize, z as isize)
}

/// Scalar field with uniform random values in `range` at fluid cells, zero elsewhere
pub fn random_fluid_field(
    obstacles: &VolumetricField,
    range: std::ops::Range<f32>,
    seed: u64,
) -> VolumetricField {
    let dims = obstacles.dimensions();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut field = VolumetricField::new(dims, 1).unwrap();
    for (x, y, z) in cells(dims) {
        if is_fluid(obstacles, x, y, z) {
            field.set(x, y, z, 0, rng.random_range(range.clone()));
        }
    }
    field
}
