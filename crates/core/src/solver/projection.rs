//! Pressure projection: divergence, Jacobi relaxation, gradient subtraction
//!
//! All three passes use central differences on the collocated grid. A
//! neighbour is treated as solid when it is marked occupied in the obstacle
//! field or lies outside the grid. Solid cells are written as zero.

use super::dispatch::{dispatch, Cell, CellKernel};
use crate::field::VolumetricField;
use crate::obstacles::is_solid;

/// Neighbour offsets in `(+x, -x, +y, -y, +z, -z)` order
const NEIGHBOURS: [(isize, isize, isize); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Reciprocal of the Jacobi diagonal for a 3D six-point stencil
const INVERSE_BETA: f32 = 1.0 / 6.0;

#[inline]
fn signed(cell: Cell) -> (isize, isize, isize) {
    cell.offset(0, 0, 0)
}

struct Divergence<'a> {
    velocity: &'a VolumetricField,
    obstacles: &'a VolumetricField,
    half_inverse_cell_size: f32,
}

impl Divergence<'_> {
    /// Velocity at a neighbour, zero if the neighbour is solid
    fn wall_velocity(&self, x: isize, y: isize, z: isize) -> [f32; 3] {
        if is_solid(self.obstacles, x, y, z) {
            return [0.0; 3];
        }
        match self.velocity.fetch(x, y, z) {
            Some(v) => [v[0], v[1], v[2]],
            None => [0.0; 3],
        }
    }
}

impl CellKernel for Divergence<'_> {
    const NAME: &'static str = "compute_divergence";

    fn shade(&self, cell: Cell, texel: &mut [f32]) {
        let (x, y, z) = signed(cell);
        if is_solid(self.obstacles, x, y, z) {
            texel[0] = 0.0;
            return;
        }

        let east = self.wall_velocity(x + 1, y, z);
        let west = self.wall_velocity(x - 1, y, z);
        let north = self.wall_velocity(x, y + 1, z);
        let south = self.wall_velocity(x, y - 1, z);
        let up = self.wall_velocity(x, y, z + 1);
        let down = self.wall_velocity(x, y, z - 1);

        texel[0] = self.half_inverse_cell_size
            * ((east[0] - west[0]) + (north[1] - south[1]) + (up[2] - down[2]));
    }
}

/// Write the divergence of `velocity` into the scalar field `dest`
///
/// Velocities at solid neighbours count as zero.
///
/// # Panics
///
/// Panics if the fields are not on the same grid, `velocity` has fewer than
/// three components, or `dest` is not scalar.
pub fn compute_divergence(
    velocity: &VolumetricField,
    obstacles: &VolumetricField,
    dest: &mut VolumetricField,
    cell_size: f32,
) {
    super::assert_bindable("compute_divergence", dest, &[velocity, obstacles]);
    assert!(velocity.components() >= 3, "Velocity needs three components");
    assert_eq!(dest.components(), 1, "Divergence target must be scalar");

    let kernel = Divergence {
        velocity,
        obstacles,
        half_inverse_cell_size: 0.5 / cell_size,
    };
    dispatch(&kernel, dest);
}

struct Jacobi<'a> {
    pressure: &'a VolumetricField,
    divergence: &'a VolumetricField,
    obstacles: &'a VolumetricField,
    alpha: f32,
}

impl CellKernel for Jacobi<'_> {
    const NAME: &'static str = "jacobi";

    fn shade(&self, cell: Cell, texel: &mut [f32]) {
        let (x, y, z) = signed(cell);
        if is_solid(self.obstacles, x, y, z) {
            texel[0] = 0.0;
            return;
        }

        let centre = self.pressure.get(cell.x, cell.y, cell.z, 0);
        let neighbours: f32 = NEIGHBOURS
            .iter()
            .map(|&(dx, dy, dz)| {
                let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                if is_solid(self.obstacles, nx, ny, nz) {
                    centre
                } else {
                    self.pressure.fetch(nx, ny, nz).map_or(centre, |p| p[0])
                }
            })
            .sum();

        let b = self.divergence.get(cell.x, cell.y, cell.z, 0);
        texel[0] = (neighbours + self.alpha * b) * INVERSE_BETA;
    }
}

/// One Jacobi relaxation step of the pressure Poisson equation
///
/// `dest = (sum of six neighbour pressures - cell_size^2 * divergence) / 6`,
/// where a solid neighbour contributes the centre pressure (zero normal
/// gradient at walls).
///
/// # Panics
///
/// Panics if the fields are not on the same grid or `pressure`,
/// `divergence`, or `dest` is not scalar.
pub fn jacobi(
    pressure: &VolumetricField,
    divergence: &VolumetricField,
    obstacles: &VolumetricField,
    dest: &mut VolumetricField,
    cell_size: f32,
) {
    super::assert_bindable("jacobi", dest, &[pressure, divergence, obstacles]);
    assert!(
        pressure.components() == 1 && divergence.components() == 1 && dest.components() == 1,
        "Jacobi operates on scalar fields"
    );

    let kernel = Jacobi {
        pressure,
        divergence,
        obstacles,
        alpha: -cell_size * cell_size,
    };
    dispatch(&kernel, dest);
}

struct SubtractGradient<'a> {
    velocity: &'a VolumetricField,
    pressure: &'a VolumetricField,
    obstacles: &'a VolumetricField,
    gradient_scale: f32,
}

impl SubtractGradient<'_> {
    /// Pressure at a neighbour and whether the neighbour is open fluid
    fn neighbour(&self, x: isize, y: isize, z: isize, centre: f32) -> (f32, bool) {
        if is_solid(self.obstacles, x, y, z) {
            return (centre, false);
        }
        match self.pressure.fetch(x, y, z) {
            Some(p) => (p[0], true),
            None => (centre, false),
        }
    }
}

impl CellKernel for SubtractGradient<'_> {
    const NAME: &'static str = "subtract_gradient";

    fn shade(&self, cell: Cell, texel: &mut [f32]) {
        let (x, y, z) = signed(cell);
        if is_solid(self.obstacles, x, y, z) {
            texel.fill(0.0);
            return;
        }

        let centre = self.pressure.get(cell.x, cell.y, cell.z, 0);
        let velocity = self.velocity.cell(cell.x, cell.y, cell.z);

        for axis in 0..3 {
            let (dx, dy, dz) = NEIGHBOURS[2 * axis];
            let (forward, forward_open) = self.neighbour(x + dx, y + dy, z + dz, centre);
            let (backward, backward_open) = self.neighbour(x - dx, y - dy, z - dz, centre);

            // Flow into or out of a wall is cancelled outright
            texel[axis] = if forward_open && backward_open {
                velocity[axis] - self.gradient_scale * (forward - backward)
            } else {
                0.0
            };
        }
        for (out, &v) in texel.iter_mut().zip(velocity).skip(3) {
            *out = v;
        }
    }
}

/// Subtract the pressure gradient from `velocity` into `dest`
///
/// Velocity components normal to an adjacent solid cell are zeroed.
///
/// # Panics
///
/// Panics if the fields are not on the same grid, `velocity` has fewer than
/// three components, `pressure` is not scalar, or `dest` and `velocity`
/// differ in component count.
pub fn subtract_gradient(
    velocity: &VolumetricField,
    pressure: &VolumetricField,
    obstacles: &VolumetricField,
    dest: &mut VolumetricField,
    gradient_scale: f32,
) {
    super::assert_bindable("subtract_gradient", dest, &[velocity, pressure, obstacles]);
    assert!(velocity.components() >= 3, "Velocity needs three components");
    assert_eq!(pressure.components(), 1, "Pressure must be scalar");
    assert_eq!(
        velocity.components(),
        dest.components(),
        "Gradient source and destination differ in components"
    );

    let kernel = SubtractGradient {
        velocity,
        pressure,
        obstacles,
        gradient_scale,
    };
    dispatch(&kernel, dest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::GridDimensions;
    use approx::assert_relative_eq;

    fn open(dims: GridDimensions) -> VolumetricField {
        VolumetricField::new(dims, 3).unwrap()
    }

    #[test]
    fn test_divergence_of_linear_field() {
        let dims = GridDimensions::cube(6).unwrap();
        let mut velocity = VolumetricField::new(dims, 3).unwrap();
        for z in 0..6 {
            for y in 0..6 {
                for x in 0..6 {
                    velocity.set(x, y, z, 0, x as f32);
                }
            }
        }
        let mut dest = VolumetricField::new(dims, 1).unwrap();

        compute_divergence(&velocity, &open(dims), &mut dest, 1.0);

        // Interior: d(vx)/dx = 1
        assert_relative_eq!(dest.get(2, 2, 2, 0), 1.0);
        // The missing neighbour past x = 5 counts as a wall with zero velocity
        assert_relative_eq!(dest.get(5, 2, 2, 0), 0.5 * (0.0 - 4.0));
    }

    #[test]
    fn test_jacobi_fixed_point_for_uniform_pressure() {
        let dims = GridDimensions::cube(5).unwrap();
        let pressure = VolumetricField::filled(dims, 1, 2.0).unwrap();
        let divergence = VolumetricField::new(dims, 1).unwrap();
        let mut dest = VolumetricField::new(dims, 1).unwrap();

        jacobi(&pressure, &divergence, &open(dims), &mut dest, 1.25);

        // Walls reflect the centre value, so a constant field is preserved
        assert!(dest.as_slice().iter().all(|&p| (p - 2.0).abs() < 1e-6));
    }

    #[test]
    fn test_jacobi_responds_to_divergence() {
        let dims = GridDimensions::cube(5).unwrap();
        let pressure = VolumetricField::new(dims, 1).unwrap();
        let mut divergence = VolumetricField::new(dims, 1).unwrap();
        divergence.set(2, 2, 2, 0, 6.0);
        let mut dest = VolumetricField::new(dims, 1).unwrap();

        jacobi(&pressure, &divergence, &open(dims), &mut dest, 1.0);

        assert_relative_eq!(dest.get(2, 2, 2, 0), -1.0);
        assert_eq!(dest.get(1, 2, 2, 0), 0.0);
    }

    #[test]
    fn test_solid_cells_are_zeroed() {
        let dims = GridDimensions::cube(4).unwrap();
        let mut obstacles = open(dims);
        obstacles.set(1, 1, 1, 0, 1.0);
        let velocity = VolumetricField::filled(dims, 3, 1.0).unwrap();
        let pressure = VolumetricField::filled(dims, 1, 1.0).unwrap();

        let mut divergence = VolumetricField::filled(dims, 1, 7.0).unwrap();
        compute_divergence(&velocity, &obstacles, &mut divergence, 1.0);
        assert_eq!(divergence.get(1, 1, 1, 0), 0.0);

        let mut relaxed = VolumetricField::filled(dims, 1, 7.0).unwrap();
        jacobi(&pressure, &divergence, &obstacles, &mut relaxed, 1.0);
        assert_eq!(relaxed.get(1, 1, 1, 0), 0.0);

        let mut projected = VolumetricField::filled(dims, 3, 7.0).unwrap();
        subtract_gradient(&velocity, &pressure, &obstacles, &mut projected, 1.0);
        assert_eq!(projected.cell(1, 1, 1), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_subtract_gradient_of_linear_pressure() {
        let dims = GridDimensions::cube(6).unwrap();
        let mut pressure = VolumetricField::new(dims, 1).unwrap();
        for z in 0..6 {
            for y in 0..6 {
                for x in 0..6 {
                    pressure.set(x, y, z, 0, 2.0 * x as f32);
                }
            }
        }
        let velocity = VolumetricField::filled(dims, 3, 1.0).unwrap();
        let mut dest = VolumetricField::new(dims, 3).unwrap();

        subtract_gradient(&velocity, &pressure, &open(dims), &mut dest, 0.5);

        let v = dest.cell(3, 3, 3);
        assert_relative_eq!(v[0], 1.0 - 0.5 * 4.0);
        assert_relative_eq!(v[1], 1.0);
        assert_relative_eq!(v[2], 1.0);
    }

    #[test]
    fn test_subtract_gradient_masks_wall_normal_flow() {
        let dims = GridDimensions::cube(4).unwrap();
        let mut obstacles = open(dims);
        obstacles.set(2, 1, 1, 0, 1.0);
        let velocity = VolumetricField::filled(dims, 3, 1.0).unwrap();
        let pressure = VolumetricField::new(dims, 1).unwrap();
        let mut dest = VolumetricField::new(dims, 3).unwrap();

        subtract_gradient(&velocity, &pressure, &obstacles, &mut dest, 1.0);

        // Next to the solid cell along x, and next to the y = 0 boundary
        assert_eq!(dest.cell(1, 1, 1), &[0.0, 1.0, 1.0]);
        assert_eq!(dest.cell(1, 0, 1), &[1.0, 0.0, 1.0]);
    }
}
