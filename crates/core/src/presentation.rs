//! Read-only view handed to renderers
//!
//! A renderer raycasts the density volume and uses the obstacle mask for
//! occlusion. It only ever receives shared references, so it cannot disturb
//! the simulation. Camera state stays on the renderer's side.

use crate::core_types::GridDimensions;
use crate::field::VolumetricField;
use crate::simulation::{FluidSimulation, SimulationState};

/// Volumes a renderer may bind
pub trait VolumeSource {
    /// Grid shared by every exposed volume
    fn dimensions(&self) -> GridDimensions;

    /// Current (post-step) smoke density, one component per cell
    fn density(&self) -> &VolumetricField;

    /// Static obstacle mask, three components per cell
    fn obstacles(&self) -> &VolumetricField;
}

impl VolumeSource for SimulationState {
    fn dimensions(&self) -> GridDimensions {
        SimulationState::dimensions(self)
    }

    fn density(&self) -> &VolumetricField {
        self.density.ping()
    }

    fn obstacles(&self) -> &VolumetricField {
        SimulationState::obstacles(self)
    }
}

impl VolumeSource for FluidSimulation {
    fn dimensions(&self) -> GridDimensions {
        self.state().dimensions()
    }

    fn density(&self) -> &VolumetricField {
        VolumeSource::density(self.state())
    }

    fn obstacles(&self) -> &VolumetricField {
        self.state().obstacles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimulationConfig;

    fn describe(source: &impl VolumeSource) -> (GridDimensions, usize, usize) {
        (
            source.dimensions(),
            source.density().components(),
            source.obstacles().components(),
        )
    }

    #[test]
    fn test_simulation_exposes_current_density() {
        let mut config = SimulationConfig::for_grid(GridDimensions::cube(8).unwrap());
        config.jacobi_iterations = 2;
        let mut sim = FluidSimulation::new(config).unwrap();
        sim.update();

        let (dims, density_components, obstacle_components) = describe(&sim);
        assert_eq!(dims, GridDimensions::cube(8).unwrap());
        assert_eq!(density_components, 1);
        assert_eq!(obstacle_components, 3);
        assert!(std::ptr::eq(
            VolumeSource::density(&sim),
            sim.state().density.ping()
        ));
    }
}
