//! Simulation parameters
//!
//! Every constant the stepper needs lives in [`SimulationConfig`]. The config
//! is fixed once a simulation is created.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::QualityPreset;
use crate::core_types::{GridDimensions, Vec3};
use crate::error::{Result, SimulationError};
use crate::obstacles::ObstacleConfig;
use crate::solver::SplatBlend;

/// Process-wide simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid shared by every field
    pub grid: GridDimensions,
    /// Edge length of one cell
    pub cell_size: f32,
    /// Impulse splat radius, in cells
    pub splat_radius: f32,
    /// Temperature at which smoke is neutrally buoyant
    pub ambient_temperature: f32,
    /// Temperature injected by the impulse
    pub impulse_temperature: f32,
    /// Density injected by the impulse
    pub impulse_density: f32,
    /// Pressure relaxation steps per frame
    pub jacobi_iterations: usize,
    /// Step length per frame
    pub time_step: f32,
    /// Lift per degree above ambient (sigma)
    pub smoke_buoyancy: f32,
    /// Downward pull per unit density (kappa)
    pub smoke_weight: f32,
    /// Gradient subtraction factor, divided by `cell_size`
    pub gradient_scale_factor: f32,
    /// Per-frame velocity decay
    pub velocity_dissipation: f32,
    /// Per-frame temperature decay
    pub temperature_dissipation: f32,
    /// Per-frame density decay
    pub density_dissipation: f32,
    /// Impulse centre, in cell-index space
    pub impulse_position: Vec3,
    /// Splat the temperature and density impulses every frame
    pub inject_impulses: bool,
    /// How impulses combine with existing contents
    pub splat_blend: SplatBlend,
    /// Obstacle geometry
    pub obstacles: ObstacleConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::for_grid(GridDimensions::default())
    }
}

impl SimulationConfig {
    /// Defaults for `grid`, with grid-dependent values derived from it
    ///
    /// The splat radius is an eighth of the width and the impulse sits near
    /// the top of the domain, centred in x and z.
    pub fn for_grid(grid: GridDimensions) -> Self {
        let splat_radius = grid.width as f32 / 8.0;
        Self {
            grid,
            cell_size: 1.25,
            splat_radius,
            ambient_temperature: 0.0,
            impulse_temperature: 10.0,
            impulse_density: 1.25,
            jacobi_iterations: 40,
            time_step: 0.25,
            smoke_buoyancy: 1.0,
            smoke_weight: 0.0,
            gradient_scale_factor: 1.125,
            velocity_dissipation: 0.99,
            temperature_dissipation: 0.99,
            density_dissipation: 0.999,
            impulse_position: default_impulse_position(grid, splat_radius),
            inject_impulses: true,
            splat_blend: SplatBlend::default(),
            obstacles: ObstacleConfig::default(),
        }
    }

    /// Defaults for a quality preset's grid
    ///
    /// # Errors
    ///
    /// Propagates grid construction errors.
    pub fn for_quality(quality: QualityPreset) -> Result<Self> {
        Ok(Self::for_grid(quality.grid_dimensions()?))
    }

    /// Factor applied to the pressure gradient (`gradient_scale_factor / cell_size`)
    #[inline]
    pub fn gradient_scale(&self) -> f32 {
        self.gradient_scale_factor / self.cell_size
    }

    /// Reject parameters the stepper cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Configuration`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        let GridDimensions {
            width,
            height,
            depth,
        } = self.grid;
        if width < 3 || height < 3 || depth < 3 {
            return Err(SimulationError::config(format!(
                "grid must be at least 3 cells along every axis, got {width}x{height}x{depth}"
            )));
        }

        for (name, value) in [
            ("cell_size", self.cell_size),
            ("time_step", self.time_step),
            ("splat_radius", self.splat_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        for (name, value) in [
            ("velocity_dissipation", self.velocity_dissipation),
            ("temperature_dissipation", self.temperature_dissipation),
            ("density_dissipation", self.density_dissipation),
        ] {
            if value.is_nan() || value <= 0.0 || value > 1.0 {
                return Err(SimulationError::config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }

        let finite = [
            ("ambient_temperature", self.ambient_temperature),
            ("impulse_temperature", self.impulse_temperature),
            ("impulse_density", self.impulse_density),
            ("smoke_buoyancy", self.smoke_buoyancy),
            ("smoke_weight", self.smoke_weight),
            ("gradient_scale_factor", self.gradient_scale_factor),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimulationError::config(format!(
                "{name} must be finite, got {value}"
            )));
        }
        if !self.impulse_position.iter().all(|c| c.is_finite()) {
            return Err(SimulationError::config("impulse_position must be finite"));
        }

        if self.jacobi_iterations == 0 {
            return Err(SimulationError::config(
                "jacobi_iterations must be at least 1",
            ));
        }

        Ok(())
    }

    /// Parse a JSON config; missing fields take their defaults
    ///
    /// The result is validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Configuration`] if the JSON is malformed or
    /// the values fail [`SimulationConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimulationError::config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Configuration`] if the file cannot be read
    /// or does not hold a valid config.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            SimulationError::config(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }
}

/// `(W/2, H - floor(radius)/2, D/2)`
fn default_impulse_position(grid: GridDimensions, splat_radius: f32) -> Vec3 {
    Vec3::new(
        grid.width as f32 / 2.0,
        grid.height as f32 - splat_radius.trunc() / 2.0,
        grid.depth as f32 / 2.0,
    )
}
