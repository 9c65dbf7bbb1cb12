//! Generic per-cell compute pass dispatch
//!
//! Every numerical pass is a [`CellKernel`]: a pure function from a cell
//! coordinate (plus the read-only fields the kernel borrows) to the cell's new
//! value. [`dispatch`] applies a kernel over every cell of one destination
//! field. Depth slices run in parallel; cells never observe each other's new
//! values, so the order is irrelevant.
//!
//! The borrow checker enforces the read/write split: a kernel holds shared
//! borrows of its inputs and `dispatch` holds the only mutable borrow of the
//! destination, so no pass can read the buffer it writes.

use rayon::prelude::*;

use super::profiler::ProfilerScope;
use crate::core_types::Vec3;
use crate::field::VolumetricField;

/// Integer coordinate of the cell being shaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
    /// Depth slice
    pub z: usize,
}

impl Cell {
    /// Cell centre in cell-index space
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Signed coordinates offset by `(dx, dy, dz)`
    #[inline]
    pub fn offset(&self, dx: isize, dy: isize, dz: isize) -> (isize, isize, isize) {
        (
            self.x as isize + dx,
            self.y as isize + dy,
            self.z as isize + dz,
        )
    }
}

/// A per-cell transform executed once for every cell of a destination field
pub trait CellKernel: Sync {
    /// Pass name reported by the profiler
    const NAME: &'static str;

    /// Produce the new contents of `cell`
    ///
    /// `texel` holds the destination's previous contents for this cell.
    /// Overwriting kernels must assign every component; blending kernels may
    /// read it first.
    fn shade(&self, cell: Cell, texel: &mut [f32]);
}

/// Apply `kernel` to every cell of `dest`
pub fn dispatch<K: CellKernel>(kernel: &K, dest: &mut VolumetricField) {
    let _scope = ProfilerScope::new(K::NAME);

    let dims = dest.dimensions();
    let components = dest.components();
    let width = dims.width;

    dest.as_mut_slice()
        .par_chunks_mut(dims.slice_len() * components)
        .enumerate()
        .for_each(|(z, slice)| {
            for (i, texel) in slice.chunks_exact_mut(components).enumerate() {
                let cell = Cell {
                    x: i % width,
                    y: i / width,
                    z,
                };
                kernel.shade(cell, texel);
            }
        });
}
