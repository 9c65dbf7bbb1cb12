//! Smoke Simulation Core Library
//!
//! A 3D Eulerian smoke simulator on a fixed voxel grid. Each frame advects
//! velocity, temperature, and density semi-Lagrangianly, adds thermal
//! buoyancy and a Gaussian smoke source, and projects the velocity towards a
//! divergence-free field with a Jacobi pressure solve.
//!
//! ## Layout
//!
//! - [`field`] - volumetric fields and ping/pong double buffers
//! - [`solver`] - the compute passes and their parallel dispatcher
//! - [`obstacles`] - the static obstacle mask
//! - [`simulation`] - configuration, state, the per-frame stepper, and the
//!   [`FluidSimulation`] driver
//! - [`snapshot`] - half-precision density persistence
//! - [`presentation`] - the read-only view renderers consume
//!
//! ## Example
//!
//! ```rust
//! use smoke_sim_core::{FluidSimulation, GridDimensions, SimulationConfig};
//!
//! let mut config = SimulationConfig::for_grid(GridDimensions::cube(16).unwrap());
//! config.jacobi_iterations = 10;
//! let mut sim = FluidSimulation::new(config).unwrap();
//! for _ in 0..5 {
//!     sim.update();
//! }
//! assert!(sim.stats().total_density > 0.0);
//! ```

pub mod core_types;
pub mod error;
pub mod field;
pub mod obstacles;
pub mod presentation;
pub mod simulation;
pub mod snapshot;
pub mod solver;

pub use core_types::{GridDimensions, Vec3};
pub use error::{Result, SimulationError};
pub use field::{Slab, VolumetricField};
pub use obstacles::{ObstacleConfig, ObstacleFieldBuilder};
pub use presentation::VolumeSource;
pub use simulation::{
    FluidSimulation, QualityPreset, SimulationConfig, SimulationState, SimulationStats,
    SimulationStepper, StepReport,
};
pub use solver::{SplatBlend, SplatParams};
