//! Vector type alias for grid-space positions and directions.

use nalgebra::Vector3;

/// 3D vector type for positions, velocities, and directions.
///
/// An alias for `nalgebra::Vector3<f32>`. Positions are expressed in
/// cell-index space: the centre of cell `(x, y, z)` sits at `(x, y, z)`.
pub type Vec3 = Vector3<f32>;
