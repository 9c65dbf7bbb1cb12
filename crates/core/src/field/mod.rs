//! Volumetric field storage
//!
//! A [`VolumetricField`] is a dense 3D array of cells holding 1 to 4 `f32`
//! components. Fields are the only data the compute passes exchange: a pass
//! binds some fields as read-only inputs and writes exactly one destination.
//! [`Slab`] pairs two same-shaped fields for ping/pong double buffering.

mod slab;

pub use slab::Slab;

use crate::core_types::{GridDimensions, Vec3};
use crate::error::{Result, SimulationError};

/// Largest number of components a cell may carry
pub const MAX_COMPONENTS: usize = 4;

/// Dense 3D field of 1–4 component cells
///
/// Storage is a flat `Vec<f32>` in z-major order with components interleaved:
/// `((z * height + y) * width + x) * components + c`.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumetricField {
    data: Vec<f32>,
    dims: GridDimensions,
    components: usize,
}

impl VolumetricField {
    /// Create a zero-initialised field
    ///
    /// # Errors
    ///
    /// - [`SimulationError::Configuration`] if a dimension is zero or
    ///   `components` is outside `1..=4`
    /// - [`SimulationError::ResourceAllocation`] if the backing storage size
    ///   overflows or cannot be reserved
    pub fn new(dims: GridDimensions, components: usize) -> Result<Self> {
        Self::filled(dims, components, 0.0)
    }

    /// Create a field with every component of every cell set to `value`
    ///
    /// # Errors
    ///
    /// Same as [`VolumetricField::new`].
    pub fn filled(dims: GridDimensions, components: usize, value: f32) -> Result<Self> {
        if !(1..=MAX_COMPONENTS).contains(&components) {
            return Err(SimulationError::config(format!(
                "component count must be in 1..=4, got {components}"
            )));
        }
        let dims = GridDimensions::new(dims.width, dims.height, dims.depth)?;

        let cells = dims.checked_cell_count();
        let len = cells.and_then(|n| n.checked_mul(components));
        let alloc_error = || SimulationError::ResourceAllocation {
            cells: cells.unwrap_or(usize::MAX),
            components,
        };
        let len = len.ok_or_else(alloc_error)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| alloc_error())?;
        data.resize(len, value);

        Ok(Self {
            data,
            dims,
            components,
        })
    }

    /// Grid dimensions of this field
    #[inline]
    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Components per cell
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Raw storage, components interleaved
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw storage, components interleaved
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Whether `other` has the same dimensions (component count may differ)
    pub fn same_grid(&self, other: &VolumetricField) -> bool {
        self.dims == other.dims
    }

    #[inline]
    fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        self.dims.index(x, y, z) * self.components
    }

    /// Components of the cell at `(x, y, z)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds
    #[inline]
    pub fn cell(&self, x: usize, y: usize, z: usize) -> &[f32] {
        assert!(
            x < self.dims.width && y < self.dims.height && z < self.dims.depth,
            "Coordinates out of bounds"
        );
        let start = self.offset(x, y, z);
        &self.data[start..start + self.components]
    }

    /// Mutable components of the cell at `(x, y, z)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds
    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize, z: usize) -> &mut [f32] {
        assert!(
            x < self.dims.width && y < self.dims.height && z < self.dims.depth,
            "Coordinates out of bounds"
        );
        let start = self.offset(x, y, z);
        &mut self.data[start..start + self.components]
    }

    /// Components of the cell at signed coordinates, `None` outside the grid
    #[inline]
    pub fn fetch(&self, x: isize, y: isize, z: isize) -> Option<&[f32]> {
        if self.dims.contains(x, y, z) {
            let start = self.offset(x as usize, y as usize, z as usize);
            Some(&self.data[start..start + self.components])
        } else {
            None
        }
    }

    /// Single component value at `(x, y, z)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinates or the component are out of bounds
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize, component: usize) -> f32 {
        self.cell(x, y, z)[component]
    }

    /// Set a single component value at `(x, y, z)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinates or the component are out of bounds
    pub fn set(&mut self, x: usize, y: usize, z: usize, component: usize, value: f32) {
        self.cell_mut(x, y, z)[component] = value;
    }

    /// Set every component of every cell to `value`
    pub fn clear(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Trilinear sample at a cell-space position
    ///
    /// The position is clamped to the cell centres of the grid, so samples
    /// never read beyond the domain. Components past `components()` are zero.
    pub fn sample_trilinear(&self, position: Vec3) -> [f32; MAX_COMPONENTS] {
        let [max_x, max_y, max_z] = self.dims.max_coord();
        let (x0, x1, tx) = axis_lerp(position.x.clamp(0.0, max_x), self.dims.width);
        let (y0, y1, ty) = axis_lerp(position.y.clamp(0.0, max_y), self.dims.height);
        let (z0, z1, tz) = axis_lerp(position.z.clamp(0.0, max_z), self.dims.depth);

        let c000 = self.offset(x0, y0, z0);
        let c100 = self.offset(x1, y0, z0);
        let c010 = self.offset(x0, y1, z0);
        let c110 = self.offset(x1, y1, z0);
        let c001 = self.offset(x0, y0, z1);
        let c101 = self.offset(x1, y0, z1);
        let c011 = self.offset(x0, y1, z1);
        let c111 = self.offset(x1, y1, z1);

        let mut out = [0.0; MAX_COMPONENTS];
        for (c, value) in out.iter_mut().enumerate().take(self.components) {
            let d = &self.data;
            let x00 = lerp(d[c000 + c], d[c100 + c], tx);
            let x10 = lerp(d[c010 + c], d[c110 + c], tx);
            let x01 = lerp(d[c001 + c], d[c101 + c], tx);
            let x11 = lerp(d[c011 + c], d[c111 + c], tx);
            let y0 = lerp(x00, x10, ty);
            let y1 = lerp(x01, x11, ty);
            *value = lerp(y0, y1, tz);
        }
        out
    }

    /// Sum of one component over all cells, accumulated in `f64`
    ///
    /// # Panics
    ///
    /// Panics if `component` is out of range
    pub fn sum(&self, component: usize) -> f64 {
        assert!(component < self.components, "Component out of range");
        self.data
            .iter()
            .skip(component)
            .step_by(self.components)
            .map(|&v| f64::from(v))
            .sum()
    }

    /// Largest value of one component over all cells
    ///
    /// # Panics
    ///
    /// Panics if `component` is out of range
    pub fn max(&self, component: usize) -> f32 {
        assert!(component < self.components, "Component out of range");
        self.data
            .iter()
            .skip(component)
            .step_by(self.components)
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Largest per-cell vector magnitude across all components
    pub fn max_magnitude(&self) -> f32 {
        self.data
            .chunks_exact(self.components)
            .map(|cell| cell.iter().map(|v| v * v).sum::<f32>().sqrt())
            .fold(0.0, f32::max)
    }

    /// Largest absolute component-wise difference to a same-shaped field
    ///
    /// # Panics
    ///
    /// Panics if the two fields differ in shape
    pub fn max_abs_difference(&self, other: &VolumetricField) -> f32 {
        assert!(
            self.dims == other.dims && self.components == other.components,
            "Field shapes differ"
        );
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }

    /// FNV-1a hash over the shape and the exact bit patterns of all values
    pub fn checksum(&self) -> u64 {
        const OFFSET: u64 = 0xcbf29ce484222325;
        const PRIME: u64 = 0x100000001b3;

        let header = [
            self.dims.width as u64,
            self.dims.height as u64,
            self.dims.depth as u64,
            self.components as u64,
        ];
        let mut hash = OFFSET;
        let words = header
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .chain(self.data.iter().flat_map(|v| v.to_bits().to_le_bytes()));
        for byte in words {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(PRIME);
        }
        hash
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Lower/upper sample indices and blend weight along one clamped axis
#[inline]
pub(crate) fn axis_lerp(coord: f32, len: usize) -> (usize, usize, f32) {
    let i0 = (coord.floor() as usize).min(len - 1);
    let i1 = (i0 + 1).min(len - 1);
    (i0, i1, coord - i0 as f32)
}
