//! Smoke simulation driver
//!
//! [`FluidSimulation`] owns a [`SimulationState`] and a [`SimulationStepper`]
//! and adds the runtime controls around them: pausing, frame counting,
//! statistics, and density snapshots.

mod config;
mod quality;
mod state;
mod stepper;

pub use config::SimulationConfig;
pub use quality::QualityPreset;
pub use state::SimulationState;
pub use stepper::{SimulationStepper, StepReport};

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::snapshot;
use crate::solver::FrameTimer;

/// Field-based smoke simulation with runtime controls
pub struct FluidSimulation {
    state: SimulationState,
    stepper: SimulationStepper,
    paused: bool,
    frame: u64,
    timer: FrameTimer,
    last_jacobi_residual: f32,
}

impl FluidSimulation {
    /// Create a new smoke simulation
    ///
    /// # Arguments
    ///
    /// * `config` - Simulation constants; validated before anything is allocated
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Configuration`](crate::SimulationError::Configuration)
    /// for invalid parameters and
    /// [`SimulationError::ResourceAllocation`](crate::SimulationError::ResourceAllocation)
    /// if field storage cannot be reserved.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let state = SimulationState::new(&config)?;
        let dims = state.dimensions();

        info!(
            "Smoke simulation initialized: {}x{}x{} grid, {} Jacobi iterations, {} solid cells",
            dims.width,
            dims.height,
            dims.depth,
            config.jacobi_iterations,
            state.solid_cells()
        );

        Ok(Self {
            state,
            stepper: SimulationStepper::new(config),
            paused: false,
            frame: 0,
            timer: FrameTimer::new(),
            last_jacobi_residual: 0.0,
        })
    }

    /// Advance by one frame unless paused
    ///
    /// # Returns
    ///
    /// `true` if a step ran, `false` if the simulation is paused
    pub fn update(&mut self) -> bool {
        if self.paused {
            return false;
        }

        let report = self.stepper.step(&mut self.state);
        self.frame += 1;
        self.timer.record(report.elapsed_ms);
        self.last_jacobi_residual = report.jacobi_residual;

        debug!(
            "Frame {}: {:.2}ms, jacobi residual {:.3e}",
            self.frame, report.elapsed_ms, report.jacobi_residual
        );
        true
    }

    /// Flip the pause flag and return the new value
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    /// Pause or resume
    pub fn set_paused(&mut self, paused: bool) {
        if paused != self.paused {
            info!(
                "Simulation {} at frame {}",
                if paused { "paused" } else { "resumed" },
                self.frame
            );
        }
        self.paused = paused;
    }

    /// Whether [`FluidSimulation::update`] currently skips the step
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of frames simulated so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Constants the simulation runs with
    pub fn config(&self) -> &SimulationConfig {
        self.stepper.config()
    }

    /// Current fields
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Summary of the current state
    pub fn stats(&self) -> SimulationStats {
        let density = self.state.density.ping();
        SimulationStats {
            frame: self.frame,
            total_density: density.sum(0),
            max_density: density.max(0),
            max_speed: self.state.velocity.ping().max_magnitude(),
            last_step_ms: self.timer.last_frame_time_ms(),
            average_step_ms: self.timer.average_ms(),
            last_jacobi_residual: self.last_jacobi_residual,
        }
    }

    /// Write the current density field to a half-precision snapshot
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::SnapshotIo`](crate::SimulationError::SnapshotIo)
    /// if the file cannot be written.
    pub fn save_density<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        snapshot::save(path, self.state.density.ping())?;
        info!("Saved density snapshot to {}", path.display());
        Ok(())
    }

    /// Replace the current density field with a snapshot
    ///
    /// On error the density field is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a snapshot error if the file is missing, unreadable, or not
    /// exactly one half-float per cell.
    pub fn load_density<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        snapshot::load(path, self.state.density.ping_mut())?;
        info!("Loaded density snapshot from {}", path.display());
        Ok(())
    }
}

/// Statistics for the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationStats {
    /// Frames simulated
    pub frame: u64,
    /// Sum of density over all cells
    pub total_density: f64,
    /// Largest cell density
    pub max_density: f32,
    /// Largest velocity magnitude
    pub max_speed: f32,
    /// Wall time of the most recent step
    pub last_step_ms: f64,
    /// Smoothed step time
    pub average_step_ms: f64,
    /// Final Jacobi residual of the most recent step
    pub last_jacobi_residual: f32,
}
