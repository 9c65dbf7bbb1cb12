//! Semi-Lagrangian advection
//!
//! Each fluid cell traces its own velocity backwards one time step, samples
//! the source field there with trilinear filtering, and scales the sample by
//! the dissipation factor. Samples never blend in values held by solid cells.

use super::dispatch::{dispatch, Cell, CellKernel};
use crate::core_types::Vec3;
use crate::field::{axis_lerp, VolumetricField};
use crate::obstacles::is_solid;

/// How many times a trace that lands inside an obstacle is shortened
const MAX_TRACE_REFINEMENTS: usize = 4;

struct Advect<'a> {
    velocity: &'a VolumetricField,
    source: &'a VolumetricField,
    obstacles: &'a VolumetricField,
    time_step: f32,
    dissipation: f32,
}

impl CellKernel for Advect<'_> {
    const NAME: &'static str = "advect";

    fn shade(&self, cell: Cell, texel: &mut [f32]) {
        if is_solid(self.obstacles, cell.x as isize, cell.y as isize, cell.z as isize) {
            texel.fill(0.0);
            return;
        }

        let v = self.velocity.cell(cell.x, cell.y, cell.z);
        let displacement = Vec3::new(v[0], v[1], v[2]) * self.time_step;
        let origin = trace_to_fluid(self.obstacles, cell.position(), displacement);
        let sample = self.source.sample_trilinear(origin);

        for (out, value) in texel.iter_mut().zip(sample) {
            *out = self.dissipation * value;
        }
    }
}

/// Back-trace from `position` by `displacement`, never sampling solid cells
///
/// The traced point is clamped to the domain. If any cell of its trilinear
/// stencil is solid, the sample snaps to the nearest open stencil centre. A
/// stencil with no open cell halves the displacement and retries; once the
/// retries run out the cell samples itself.
fn trace_to_fluid(obstacles: &VolumetricField, position: Vec3, displacement: Vec3) -> Vec3 {
    if !displacement.iter().all(|d| d.is_finite()) {
        return position;
    }

    let [max_x, max_y, max_z] = obstacles.dimensions().max_coord();
    let mut step = displacement;

    for _ in 0..=MAX_TRACE_REFINEMENTS {
        let traced = position - step;
        let clamped = Vec3::new(
            traced.x.clamp(0.0, max_x),
            traced.y.clamp(0.0, max_y),
            traced.z.clamp(0.0, max_z),
        );
        if let Some(sample) = open_sample(obstacles, clamped) {
            return sample;
        }
        step *= 0.5;
    }

    position
}

/// Lower and upper stencil indices along one axis
#[inline]
fn axis_pair(coord: f32, len: usize) -> [usize; 2] {
    let (lo, hi, _) = axis_lerp(coord, len);
    [lo, hi]
}

/// Sample point for `point` that reads only open cells
///
/// Returns `point` itself when its whole stencil is open, the nearest open
/// stencil centre when part of it is solid, and `None` when all of it is.
fn open_sample(obstacles: &VolumetricField, point: Vec3) -> Option<Vec3> {
    let dims = obstacles.dimensions();
    let xs = axis_pair(point.x, dims.width);
    let ys = axis_pair(point.y, dims.height);
    let zs = axis_pair(point.z, dims.depth);

    let mut touches_solid = false;
    let mut nearest: Option<(f32, Vec3)> = None;
    for &z in &zs {
        for &y in &ys {
            for &x in &xs {
                if is_solid(obstacles, x as isize, y as isize, z as isize) {
                    touches_solid = true;
                    continue;
                }
                let centre = Vec3::new(x as f32, y as f32, z as f32);
                let distance_sq = (centre - point).norm_squared();
                if nearest.is_none_or(|(best, _)| distance_sq < best) {
                    nearest = Some((distance_sq, centre));
                }
            }
        }
    }

    if touches_solid {
        nearest.map(|(_, centre)| centre)
    } else {
        Some(point)
    }
}

/// Move `source` along `velocity` into `dest`
///
/// `dest(c) = dissipation * source(c - time_step * velocity(c))` for fluid
/// cells; solid cells are written as zero.
///
/// # Arguments
/// * `velocity` - 3-component velocity, in cells per unit time
/// * `source` - Quantity to transport; may be `velocity` itself
/// * `obstacles` - Obstacle field (component 0 is occupancy)
/// * `dest` - Write target with the same shape as `source`
/// * `time_step` - Step length
/// * `dissipation` - Per-step multiplier in `[0, 1]`
///
/// # Panics
///
/// Panics if the fields are not on the same grid, `velocity` has fewer than
/// three components, or `source` and `dest` differ in component count.
pub fn advect(
    velocity: &VolumetricField,
    source: &VolumetricField,
    obstacles: &VolumetricField,
    dest: &mut VolumetricField,
    time_step: f32,
    dissipation: f32,
) {
    super::assert_bindable("advect", dest, &[velocity, source, obstacles]);
    assert!(velocity.components() >= 3, "Velocity needs three components");
    assert_eq!(
        source.components(),
        dest.components(),
        "Advection source and destination differ in components"
    );

    let kernel = Advect {
        velocity,
        source,
        obstacles,
        time_step,
        dissipation,
    };
    dispatch(&kernel, dest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::GridDimensions;
    use approx::assert_relative_eq;

    fn open_obstacles(dims: GridDimensions) -> VolumetricField {
        VolumetricField::new(dims, 3).unwrap()
    }

    #[test]
    fn test_zero_velocity_only_dissipates() {
        let dims = GridDimensions::cube(6).unwrap();
        let velocity = VolumetricField::new(dims, 3).unwrap();
        let obstacles = open_obstacles(dims);
        let mut source = VolumetricField::new(dims, 1).unwrap();
        source.set(2, 3, 4, 0, 2.0);
        let mut dest = VolumetricField::new(dims, 1).unwrap();

        advect(&velocity, &source, &obstacles, &mut dest, 0.25, 0.5);

        assert_relative_eq!(dest.get(2, 3, 4, 0), 1.0);
        assert_relative_eq!(dest.sum(0), 1.0);
    }

    #[test]
    fn test_uniform_velocity_shifts_by_whole_cells() {
        let dims = GridDimensions::cube(8).unwrap();
        let mut velocity = VolumetricField::new(dims, 3).unwrap();
        for z in 0..8 {
            for y in 0..8 {
                for x in 0..8 {
                    velocity.set(x, y, z, 0, 4.0);
                }
            }
        }
        let obstacles = open_obstacles(dims);
        let mut source = VolumetricField::new(dims, 1).unwrap();
        source.set(3, 4, 4, 0, 1.0);
        let mut dest = VolumetricField::new(dims, 1).unwrap();

        advect(&velocity, &source, &obstacles, &mut dest, 0.25, 1.0);

        assert_relative_eq!(dest.get(4, 4, 4, 0), 1.0);
        assert_relative_eq!(dest.get(3, 4, 4, 0), 0.0);
    }

    #[test]
    fn test_solid_cells_are_zeroed() {
        let dims = GridDimensions::cube(4).unwrap();
        let velocity = VolumetricField::new(dims, 3).unwrap();
        let mut obstacles = open_obstacles(dims);
        obstacles.set(1, 1, 1, 0, 1.0);
        let source = VolumetricField::filled(dims, 1, 3.0).unwrap();
        let mut dest = VolumetricField::new(dims, 1).unwrap();

        advect(&velocity, &source, &obstacles, &mut dest, 0.25, 1.0);

        assert_eq!(dest.get(1, 1, 1, 0), 0.0);
        assert_relative_eq!(dest.get(2, 1, 1, 0), 3.0);
    }

    #[test]
    fn test_trace_snaps_to_nearest_open_centre() {
        let dims = GridDimensions::cube(8).unwrap();
        let mut obstacles = open_obstacles(dims);
        obstacles.set(2, 4, 4, 0, 1.0);

        // The stencil around x = 2.3 includes the solid cell at x = 2
        let from = Vec3::new(4.0, 4.0, 4.0);
        let traced = trace_to_fluid(&obstacles, from, Vec3::new(1.7, 0.0, 0.0));
        assert_eq!(traced, Vec3::new(3.0, 4.0, 4.0));

        // Tracing from next to a wall never leaves the domain
        let traced = trace_to_fluid(&obstacles, Vec3::zeros(), Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(traced, Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_trace_into_solid_block_is_shortened() {
        let dims = GridDimensions::cube(8).unwrap();
        let mut obstacles = open_obstacles(dims);
        for z in 4..6 {
            for y in 4..6 {
                for x in 1..3 {
                    obstacles.set(x, y, z, 0, 1.0);
                }
            }
        }

        // A full step lands in a stencil with no open cell; half a step does not
        let from = Vec3::new(5.0, 4.0, 4.0);
        let traced = trace_to_fluid(&obstacles, from, Vec3::new(3.5, 0.0, 0.0));
        assert_eq!(traced, Vec3::new(3.25, 4.0, 4.0));
    }

    #[test]
    fn test_fluid_cell_never_reads_a_loaded_wall() {
        let dims = GridDimensions::cube(6).unwrap();
        let mut obstacles = open_obstacles(dims);
        obstacles.set(0, 3, 3, 0, 1.0);
        let mut source = VolumetricField::new(dims, 1).unwrap();
        source.set(0, 3, 3, 0, 100.0);
        let mut velocity = VolumetricField::new(dims, 3).unwrap();
        velocity.set(1, 3, 3, 0, 1.2);
        let mut dest = VolumetricField::new(dims, 1).unwrap();

        advect(&velocity, &source, &obstacles, &mut dest, 0.25, 1.0);

        assert_eq!(dest.get(1, 3, 3, 0), 0.0);
        assert_eq!(dest.get(0, 3, 3, 0), 0.0);
        assert_eq!(dest.sum(0), 0.0);
    }

    #[test]
    fn test_non_finite_velocity_samples_in_place() {
        let dims = GridDimensions::cube(4).unwrap();
        let obstacles = open_obstacles(dims);
        let from = Vec3::new(2.0, 2.0, 2.0);
        let traced = trace_to_fluid(&obstacles, from, Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(traced, from);
    }

    #[test]
    #[should_panic(expected = "Velocity needs three components")]
    fn test_scalar_velocity_is_rejected() {
        let dims = GridDimensions::cube(2).unwrap();
        let scalar = VolumetricField::new(dims, 1).unwrap();
        let obstacles = open_obstacles(dims);
        let mut dest = VolumetricField::new(dims, 1).unwrap();
        advect(&scalar, &scalar, &obstacles, &mut dest, 0.25, 1.0);
    }
}
