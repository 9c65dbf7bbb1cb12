//! Per-frame pass sequence

use tracing::trace;

use super::{SimulationConfig, SimulationState};
use crate::solver::{
    advect, apply_buoyancy, apply_impulse, compute_divergence, jacobi, subtract_gradient,
    BuoyancyParams, ProfilerScope, SplatParams,
};

/// Outcome of one simulated frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// `max |p_new - p_old|` over the grid in the final Jacobi iteration
    pub jacobi_residual: f32,
    /// Wall time of the step in milliseconds
    pub elapsed_ms: f64,
}

/// Runs the fixed pass sequence that advances a [`SimulationState`] by one frame
///
/// The order never varies:
///
/// 1. advect velocity by itself
/// 2. advect temperature by velocity
/// 3. advect density by velocity
/// 4. apply buoyancy to velocity
/// 5. splat the temperature impulse, then the density impulse, in place
/// 6. compute the velocity divergence
/// 7. clear pressure to zero
/// 8. relax pressure `jacobi_iterations` times
/// 9. subtract the pressure gradient from velocity
///
/// Every pass except the impulses and the divergence is followed by a swap of
/// the buffer it wrote.
#[derive(Debug, Clone)]
pub struct SimulationStepper {
    config: SimulationConfig,
}

impl SimulationStepper {
    /// Stepper using the constants in `config`
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Constants this stepper runs with
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Advance `state` by one frame
    ///
    /// # Panics
    ///
    /// Panics if `state` was built for a different grid than the config.
    pub fn step(&self, state: &mut SimulationState) -> StepReport {
        let scope = ProfilerScope::new("step");
        let c = &self.config;
        let obstacles = &state.obstacles;

        let (velocity, dest) = state.velocity.ping_pong();
        advect(velocity, velocity, obstacles, dest, c.time_step, c.velocity_dissipation);
        state.velocity.swap();

        let velocity = state.velocity.ping();
        let (temperature, dest) = state.temperature.ping_pong();
        advect(velocity, temperature, obstacles, dest, c.time_step, c.temperature_dissipation);
        state.temperature.swap();

        let (density, dest) = state.density.ping_pong();
        advect(velocity, density, obstacles, dest, c.time_step, c.density_dissipation);
        state.density.swap();

        let (velocity, dest) = state.velocity.ping_pong();
        apply_buoyancy(
            velocity,
            state.temperature.ping(),
            state.density.ping(),
            dest,
            BuoyancyParams {
                ambient_temperature: c.ambient_temperature,
                time_step: c.time_step,
                buoyancy: c.smoke_buoyancy,
                weight: c.smoke_weight,
            },
        );
        state.velocity.swap();

        if c.inject_impulses {
            let splat = SplatParams {
                radius: c.splat_radius,
                blend: c.splat_blend,
            };
            apply_impulse(
                state.temperature.ping_mut(),
                obstacles,
                c.impulse_position,
                c.impulse_temperature,
                splat,
            );
            apply_impulse(
                state.density.ping_mut(),
                obstacles,
                c.impulse_position,
                c.impulse_density,
                splat,
            );
        }

        compute_divergence(
            state.velocity.ping(),
            obstacles,
            &mut state.divergence,
            c.cell_size,
        );

        state.pressure.ping_mut().clear(0.0);
        let mut jacobi_residual = 0.0;
        for iteration in 0..c.jacobi_iterations {
            let (pressure, dest) = state.pressure.ping_pong();
            jacobi(pressure, &state.divergence, obstacles, dest, c.cell_size);
            if iteration + 1 == c.jacobi_iterations {
                jacobi_residual = dest.max_abs_difference(pressure);
            }
            state.pressure.swap();
        }

        let (velocity, dest) = state.velocity.ping_pong();
        subtract_gradient(
            velocity,
            state.pressure.ping(),
            obstacles,
            dest,
            c.gradient_scale(),
        );
        state.velocity.swap();

        let elapsed_ms = scope.elapsed_ms();
        trace!(jacobi_residual, elapsed_ms, "step complete");
        StepReport {
            jacobi_residual,
            elapsed_ms,
        }
    }
}
