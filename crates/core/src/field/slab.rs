//! Ping/pong double buffer

use super::VolumetricField;
use crate::core_types::GridDimensions;
use crate::error::Result;

/// Two same-shaped fields with a movable "current" label
///
/// The fields live in a fixed two-slot array and `ping` is the index of the
/// slot holding the last-written state. A pass reads ping and writes pong;
/// [`Slab::swap`] then relabels the slots. Swapping never copies data and
/// never invalidates either field.
#[derive(Debug, Clone)]
pub struct Slab {
    surfaces: [VolumetricField; 2],
    ping: usize,
    swaps: u64,
}

impl Slab {
    /// Create a slab of two zeroed fields
    ///
    /// # Errors
    ///
    /// Propagates field creation errors (configuration or allocation).
    pub fn new(dims: GridDimensions, components: usize) -> Result<Self> {
        Ok(Self {
            surfaces: [
                VolumetricField::new(dims, components)?,
                VolumetricField::new(dims, components)?,
            ],
            ping: 0,
            swaps: 0,
        })
    }

    /// Current (last-written) state
    #[inline]
    pub fn ping(&self) -> &VolumetricField {
        &self.surfaces[self.ping]
    }

    /// Current state for in-place blending and clearing
    #[inline]
    pub fn ping_mut(&mut self) -> &mut VolumetricField {
        &mut self.surfaces[self.ping]
    }

    /// Disposable write target
    #[inline]
    pub fn pong(&self) -> &VolumetricField {
        &self.surfaces[self.ping ^ 1]
    }

    /// Disposable write target, mutably
    #[inline]
    pub fn pong_mut(&mut self) -> &mut VolumetricField {
        &mut self.surfaces[self.ping ^ 1]
    }

    /// Borrow ping for reading and pong for writing at the same time
    pub fn ping_pong(&mut self) -> (&VolumetricField, &mut VolumetricField) {
        let [first, second] = &mut self.surfaces;
        if self.ping == 0 {
            (&*first, second)
        } else {
            (&*second, first)
        }
    }

    /// Exchange the ping and pong labels
    #[inline]
    pub fn swap(&mut self) {
        self.ping ^= 1;
        self.swaps += 1;
    }

    /// Slot (0 or 1) currently labelled ping
    #[inline]
    pub fn ping_slot(&self) -> usize {
        self.ping
    }

    /// Slot (0 or 1) currently labelled pong
    #[inline]
    pub fn pong_slot(&self) -> usize {
        self.ping ^ 1
    }

    /// Number of swaps performed since creation
    pub fn swap_count(&self) -> u64 {
        self.swaps
    }

    /// Grid dimensions shared by both fields
    pub fn dimensions(&self) -> GridDimensions {
        self.surfaces[0].dimensions()
    }

    /// Components per cell of both fields
    pub fn components(&self) -> usize {
        self.surfaces[0].components()
    }
}
