//! Compute-pass library
//!
//! Each public function here is one compute pass: it binds some fields as
//! read-only inputs and fully writes one destination field (the impulse
//! splat blends into its destination instead). Passes run through a single
//! generic dispatcher that parallelises over depth slices with rayon.
//!
//! # Example
//!
//! ```rust
//! use smoke_sim_core::solver::{self, SplatBlend, SplatParams};
//! use smoke_sim_core::{GridDimensions, Vec3, VolumetricField};
//!
//! let dims = GridDimensions::cube(16).unwrap();
//! let mut density = VolumetricField::new(dims, 1).unwrap();
//! let obstacles = VolumetricField::new(dims, 3).unwrap();
//! let splat = SplatParams { radius: 2.0, blend: SplatBlend::Over };
//! solver::apply_impulse(&mut density, &obstacles, Vec3::new(8.0, 8.0, 8.0), 1.0, splat);
//! assert!(density.sum(0) > 0.0);
//! ```

mod advection;
mod dispatch;
mod forces;
pub mod profiler;
mod projection;

pub use advection::advect;
pub use dispatch::{dispatch, Cell, CellKernel};
pub use forces::{apply_buoyancy, apply_impulse, BuoyancyParams, SplatBlend, SplatParams, UP_AXIS};
pub use profiler::{FrameTimer, ProfilerScope};
pub use projection::{compute_divergence, jacobi, subtract_gradient};

use crate::field::VolumetricField;

/// Check that every input shares the destination's grid
///
/// # Panics
///
/// Panics naming the pass if any input is on a different grid.
fn assert_bindable(pass: &str, dest: &VolumetricField, inputs: &[&VolumetricField]) {
    for input in inputs {
        assert!(
            input.same_grid(dest),
            "{pass}: input field {:?} does not match destination grid {:?}",
            input.dimensions(),
            dest.dimensions()
        );
    }
}
