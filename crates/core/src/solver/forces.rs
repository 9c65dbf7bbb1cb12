//! External forces: thermal buoyancy and Gaussian impulse splats

use serde::{Deserialize, Serialize};

use super::dispatch::{dispatch, Cell, CellKernel};
use crate::core_types::Vec3;
use crate::field::VolumetricField;
use crate::obstacles::is_solid;

/// Velocity component aligned with "up"
pub const UP_AXIS: usize = 1;

/// Parameters for the buoyancy pass
#[derive(Debug, Clone, Copy)]
pub struct BuoyancyParams {
    /// Temperature at which smoke neither rises nor sinks
    pub ambient_temperature: f32,
    /// Step length
    pub time_step: f32,
    /// Lift per degree above ambient (sigma)
    pub buoyancy: f32,
    /// Downward pull per unit density (kappa)
    pub weight: f32,
}

struct Buoyancy<'a> {
    velocity: &'a VolumetricField,
    temperature: &'a VolumetricField,
    density: &'a VolumetricField,
    params: BuoyancyParams,
}

impl CellKernel for Buoyancy<'_> {
    const NAME: &'static str = "apply_buoyancy";

    fn shade(&self, cell: Cell, texel: &mut [f32]) {
        let (x, y, z) = (cell.x, cell.y, cell.z);
        texel.copy_from_slice(self.velocity.cell(x, y, z));

        let t = self.temperature.get(x, y, z, 0);
        let p = &self.params;
        if t > p.ambient_temperature {
            let d = self.density.get(x, y, z, 0);
            texel[UP_AXIS] += p.time_step * (t - p.ambient_temperature) * p.buoyancy - d * p.weight;
        }
    }
}

/// Add thermal lift to a velocity field
///
/// Cells warmer than ambient gain `time_step * (T - ambient) * buoyancy -
/// density * weight` along the up axis. All other cells copy their velocity
/// unchanged.
///
/// # Panics
///
/// Panics if the fields are not on the same grid or `dest` and `velocity`
/// differ in component count.
pub fn apply_buoyancy(
    velocity: &VolumetricField,
    temperature: &VolumetricField,
    density: &VolumetricField,
    dest: &mut VolumetricField,
    params: BuoyancyParams,
) {
    super::assert_bindable("apply_buoyancy", dest, &[velocity, temperature, density]);
    assert!(velocity.components() > UP_AXIS, "Velocity has no up component");
    assert_eq!(
        velocity.components(),
        dest.components(),
        "Buoyancy source and destination differ in components"
    );

    let kernel = Buoyancy {
        velocity,
        temperature,
        density,
        params,
    };
    dispatch(&kernel, dest);
}

/// How an impulse combines with the existing field contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplatBlend {
    /// Blend towards the impulse value by the splat coverage
    ///
    /// A cell never moves past the impulse value, so repeated injection
    /// saturates instead of accumulating without bound.
    #[default]
    Over,
    /// Add `coverage * value` to the existing contents
    Additive,
}

impl SplatBlend {
    /// Combine `current` with `value` at the given coverage in `[0, 1]`
    #[inline]
    pub fn apply(self, current: f32, value: f32, coverage: f32) -> f32 {
        match self {
            SplatBlend::Over => {
                let blended = current + coverage * (value - current);
                blended.clamp(current.min(value), current.max(value))
            }
            SplatBlend::Additive => current + coverage * value,
        }
    }
}

/// Shape of an impulse splat
#[derive(Debug, Clone, Copy)]
pub struct SplatParams {
    /// Radius in cells; cells at or beyond it are untouched
    pub radius: f32,
    /// Blend mode
    pub blend: SplatBlend,
}

struct Splat<'a> {
    obstacles: &'a VolumetricField,
    point: Vec3,
    value: f32,
    splat: SplatParams,
}

impl CellKernel for Splat<'_> {
    const NAME: &'static str = "apply_impulse";

    fn shade(&self, cell: Cell, texel: &mut [f32]) {
        if is_solid(self.obstacles, cell.x as isize, cell.y as isize, cell.z as isize) {
            return;
        }

        let radius_sq = self.splat.radius * self.splat.radius;
        let distance_sq = (cell.position() - self.point).norm_squared();
        if distance_sq >= radius_sq {
            return;
        }

        let coverage = (-distance_sq / radius_sq).exp();
        for v in texel.iter_mut() {
            *v = self.splat.blend.apply(*v, self.value, coverage);
        }
    }
}

/// Splat a Gaussian impulse of `value` into `dest` in place
///
/// Coverage falls off as `exp(-d^2 / r^2)` with distance `d` from `position`
/// and is zero at and beyond the radius. `position` is clamped into the grid.
/// Solid cells are never written. A non-positive radius leaves the field
/// untouched.
///
/// # Panics
///
/// Panics if `obstacles` is not on the same grid as `dest`.
pub fn apply_impulse(
    dest: &mut VolumetricField,
    obstacles: &VolumetricField,
    position: Vec3,
    value: f32,
    splat: SplatParams,
) {
    super::assert_bindable("apply_impulse", dest, &[obstacles]);
    if splat.radius.is_nan() || splat.radius <= 0.0 {
        return;
    }

    let [max_x, max_y, max_z] = dest.dimensions().max_coord();
    let point = Vec3::new(
        position.x.clamp(0.0, max_x),
        position.y.clamp(0.0, max_y),
        position.z.clamp(0.0, max_z),
    );
    let kernel = Splat {
        obstacles,
        point,
        value,
        splat,
    };
    dispatch(&kernel, dest);
}
