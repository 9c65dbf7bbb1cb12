//! Static obstacle mask
//!
//! The obstacle field is a 3-component [`VolumetricField`] built once at
//! startup and read-only afterwards:
//!
//! | Component | Meaning |
//! |---|---|
//! | 0 | occupancy: `1.0` solid, `0.0` fluid |
//! | 1, 2 | in-slice unit normal of boundary cells, zero elsewhere |
//!
//! The solver passes read only component 0. The normals are carried for
//! renderers, which use them to shade and occlude against walls.
//!
//! The six faces of the grid are always solid. Optionally a solid disc is
//! rasterised into every depth slice, with a radius that is largest at
//! mid-depth and shrinks to nothing towards the front and back faces.

use serde::{Deserialize, Serialize};

use crate::core_types::GridDimensions;
use crate::error::Result;
use crate::field::VolumetricField;
use crate::solver::{dispatch, Cell, CellKernel};

/// Components in an obstacle field
pub const OBSTACLE_COMPONENTS: usize = 3;

/// Obstacle geometry switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Rasterise the per-slice disc in addition to the domain faces
    pub sphere: bool,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self { sphere: true }
    }
}

/// Whether the cell at signed coordinates blocks flow
///
/// Cells outside the grid count as solid.
#[inline]
pub fn is_solid(obstacles: &VolumetricField, x: isize, y: isize, z: isize) -> bool {
    obstacles.fetch(x, y, z).is_none_or(|c| c[0] > 0.0)
}

/// Number of solid cells in an obstacle field
pub fn solid_cell_count(obstacles: &VolumetricField) -> usize {
    obstacles
        .as_slice()
        .chunks_exact(obstacles.components())
        .filter(|c| c[0] > 0.0)
        .count()
}

/// Radius of the solid disc in `slice`, as a fraction of the half-extent
///
/// The first and last slices get an oversized radius so they are entirely
/// solid.
pub fn disc_radius(slice: usize, depth: usize) -> f32 {
    let half = depth as f32 / 2.0;
    let distance = (slice as f32 - half).abs() / half;
    let radius = 0.5 * (1.0 - distance.sqrt());
    if slice == 0 || slice + 1 == depth {
        radius * 100.0
    } else {
        radius
    }
}

/// Builds the static obstacle field for a grid
#[derive(Debug, Clone, Copy)]
pub struct ObstacleFieldBuilder {
    dims: GridDimensions,
    config: ObstacleConfig,
}

impl ObstacleFieldBuilder {
    /// Builder for `dims` with the default geometry
    pub fn new(dims: GridDimensions) -> Self {
        Self {
            dims,
            config: ObstacleConfig::default(),
        }
    }

    /// Replace the geometry switches
    pub fn with_config(mut self, config: ObstacleConfig) -> Self {
        self.config = config;
        self
    }

    /// Rasterise the mask
    ///
    /// # Errors
    ///
    /// Propagates field creation errors.
    pub fn build(&self) -> Result<VolumetricField> {
        let mut field = VolumetricField::new(self.dims, OBSTACLE_COMPONENTS)?;
        dispatch(
            &Rasterize {
                dims: self.dims,
                sphere: self.config.sphere,
            },
            &mut field,
        );
        Ok(field)
    }
}

struct Rasterize {
    dims: GridDimensions,
    sphere: bool,
}

impl Rasterize {
    /// Inward normal of a face cell, `None` for cells off the faces
    fn face_normal(&self, cell: Cell) -> Option<[f32; 2]> {
        let GridDimensions {
            width,
            height,
            depth,
        } = self.dims;
        let on_x = cell.x == 0 || cell.x + 1 == width;
        let on_y = cell.y == 0 || cell.y + 1 == height;
        let on_z = cell.z == 0 || cell.z + 1 == depth;
        if !(on_x || on_y || on_z) {
            return None;
        }

        let inward = |i: usize, len: usize| -> f32 {
            if i == 0 {
                1.0
            } else if i + 1 == len {
                -1.0
            } else {
                0.0
            }
        };
        Some(normalize(inward(cell.x, width), inward(cell.y, height)))
    }
}

impl CellKernel for Rasterize {
    const NAME: &'static str = "build_obstacles";

    fn shade(&self, cell: Cell, texel: &mut [f32]) {
        if let Some([nx, ny]) = self.face_normal(cell) {
            texel.copy_from_slice(&[1.0, nx, ny]);
            return;
        }

        if self.sphere {
            let half_w = self.dims.width as f32 / 2.0;
            let half_h = self.dims.height as f32 / 2.0;
            let dx = (cell.x as f32 + 0.5 - half_w) / half_w;
            let dy = (cell.y as f32 + 0.5 - half_h) / half_h;
            let radius = disc_radius(cell.z, self.dims.depth);
            if dx * dx + dy * dy <= radius * radius {
                let [nx, ny] = normalize(dx, dy);
                texel.copy_from_slice(&[1.0, nx, ny]);
                return;
            }
        }

        texel.fill(0.0);
    }
}

fn normalize(x: f32, y: f32) -> [f32; 2] {
    let len = x.hypot(y);
    if len > 0.0 {
        [x / len, y / len]
    } else {
        [0.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faces_are_solid_and_interior_open() {
        let dims = GridDimensions::cube(8).unwrap();
        let field = ObstacleFieldBuilder::new(dims)
            .with_config(ObstacleConfig { sphere: false })
            .build()
            .unwrap();

        for z in 0..8 {
            for y in 0..8 {
                for x in 0..8 {
                    let on_face = [x, y, z].iter().any(|&i| i == 0 || i == 7);
                    assert_eq!(
                        is_solid(&field, x as isize, y as isize, z as isize),
                        on_face,
                        "cell ({x}, {y}, {z})"
                    );
                }
            }
        }
        // 8^3 - 6^3
        assert_eq!(solid_cell_count(&field), 512 - 216);
    }

    #[test]
    fn test_face_normals_point_inward() {
        let dims = GridDimensions::cube(6).unwrap();
        let field = ObstacleFieldBuilder::new(dims).build().unwrap();

        assert_eq!(field.cell(0, 3, 3), &[1.0, 1.0, 0.0]);
        assert_eq!(field.cell(5, 3, 3), &[1.0, -1.0, 0.0]);
        assert_eq!(field.cell(3, 5, 3), &[1.0, 0.0, -1.0]);
        // Front and back faces have no in-slice normal
        assert_eq!(&field.cell(3, 3, 0)[1..], &[0.0, 0.0]);
    }

    #[test]
    fn test_disc_is_widest_at_mid_depth() {
        assert_eq!(disc_radius(32, 64), 0.5);
        assert!(disc_radius(16, 64) < disc_radius(24, 64));
        assert!(disc_radius(63, 64) > disc_radius(62, 64));
    }

    #[test]
    fn test_sphere_blocks_centre_of_mid_slice() {
        let dims = GridDimensions::cube(32).unwrap();
        let field = ObstacleFieldBuilder::new(dims).build().unwrap();

        assert!(is_solid(&field, 16, 16, 16));
        assert!(!is_solid(&field, 4, 16, 16));
        // Near the back face the disc has shrunk away
        assert!(!is_solid(&field, 16, 16, 1));

        // Disc normals point away from the slice centre
        let n = field.cell(20, 16, 16);
        assert!(n[1] > 0.9);
        assert!(n[2].abs() < 0.2);
    }

    #[test]
    fn test_outside_grid_is_solid() {
        let dims = GridDimensions::cube(3).unwrap();
        let field = VolumetricField::new(dims, OBSTACLE_COMPONENTS).unwrap();
        assert!(!is_solid(&field, 1, 1, 1));
        assert!(is_solid(&field, -1, 1, 1));
        assert!(is_solid(&field, 1, 3, 1));
    }
}
