//! Grid dimensions shared by every volumetric field in a simulation

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Width × height × depth of the simulation grid, in cells
///
/// Fixed for the lifetime of a simulation. Every field bound to the same pass
/// must share one `GridDimensions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    /// Cells along x
    pub width: usize,
    /// Cells along y (the buoyancy axis)
    pub height: usize,
    /// Cells along z (the slice axis)
    pub depth: usize,
}

impl GridDimensions {
    /// Create grid dimensions, rejecting zero-sized axes
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Configuration`] if any dimension is zero.
    pub fn new(width: usize, height: usize, depth: usize) -> Result<Self> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(SimulationError::config(format!(
                "grid dimensions must be positive, got {width}x{height}x{depth}"
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// Cubic grid with `n` cells per side
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Configuration`] if `n` is zero.
    pub fn cube(n: usize) -> Result<Self> {
        Self::new(n, n, n)
    }

    /// Total number of cells, or `None` on overflow
    pub fn checked_cell_count(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(self.depth))
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Number of cells in one depth slice
    #[inline]
    pub fn slice_len(&self) -> usize {
        self.width * self.height
    }

    /// Linear cell index for `(x, y, z)`; z-major, then y, then x
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    /// Whether signed coordinates fall inside the grid
    #[inline]
    pub fn contains(&self, x: isize, y: isize, z: isize) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && (z as usize) < self.depth
    }

    /// Largest valid cell-centre coordinate along each axis
    pub fn max_coord(&self) -> [f32; 3] {
        [
            (self.width - 1) as f32,
            (self.height - 1) as f32,
            (self.depth - 1) as f32,
        ]
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            depth: 64,
        }
    }
}
