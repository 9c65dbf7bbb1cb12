//! Simulation-owned fields

use super::SimulationConfig;
use crate::core_types::GridDimensions;
use crate::error::Result;
use crate::field::{Slab, VolumetricField};
use crate::obstacles::{solid_cell_count, ObstacleFieldBuilder};

/// All fields of one simulation
///
/// The state is created once and then advanced in place by a
/// [`SimulationStepper`](super::SimulationStepper). The double-buffered
/// quantities are public so callers can seed or inspect them; the obstacle
/// mask is read-only after construction.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// 3-component velocity
    pub velocity: Slab,
    /// Scalar temperature
    pub temperature: Slab,
    /// Scalar smoke density
    pub density: Slab,
    /// Scalar pressure
    pub pressure: Slab,
    /// Scratch divergence, rewritten every frame
    pub divergence: VolumetricField,
    pub(crate) obstacles: VolumetricField,
}

impl SimulationState {
    /// Allocate every field for `config.grid` and build the obstacle mask
    ///
    /// Temperature starts at ambient; everything else starts at zero.
    ///
    /// # Errors
    ///
    /// Propagates field creation errors.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let dims = config.grid;
        let mut temperature = Slab::new(dims, 1)?;
        temperature.ping_mut().clear(config.ambient_temperature);

        Ok(Self {
            velocity: Slab::new(dims, 3)?,
            temperature,
            density: Slab::new(dims, 1)?,
            pressure: Slab::new(dims, 1)?,
            divergence: VolumetricField::new(dims, 1)?,
            obstacles: ObstacleFieldBuilder::new(dims)
                .with_config(config.obstacles)
                .build()?,
        })
    }

    /// Grid shared by every field
    pub fn dimensions(&self) -> GridDimensions {
        self.obstacles.dimensions()
    }

    /// Static obstacle mask
    pub fn obstacles(&self) -> &VolumetricField {
        &self.obstacles
    }

    /// Number of solid cells in the obstacle mask
    pub fn solid_cells(&self) -> usize {
        solid_cell_count(&self.obstacles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let mut config = SimulationConfig::for_grid(GridDimensions::cube(8).unwrap());
        config.ambient_temperature = 2.5;
        let state = SimulationState::new(&config).unwrap();

        assert_eq!(state.velocity.components(), 3);
        assert_eq!(state.density.components(), 1);
        assert!(state.temperature.ping().as_slice().iter().all(|&t| t == 2.5));
        assert_eq!(state.density.ping().sum(0), 0.0);
        assert_eq!(state.dimensions(), config.grid);
        assert!(state.solid_cells() >= 8 * 8 * 8 - 6 * 6 * 6);
    }
}
