//! Quality presets for grid resolution
//!
//! A preset picks the grid at startup. Higher quality means a finer grid and
//! a proportionally larger per-frame cost; the grid never changes afterwards.

use serde::{Deserialize, Serialize};

use crate::core_types::GridDimensions;
use crate::error::Result;

/// Quality preset determining grid resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    /// 32³ cells
    Low,
    /// 64³ cells
    #[default]
    Medium,
    /// 128³ cells
    High,
}

impl QualityPreset {
    /// Cells along each axis
    #[must_use]
    pub const fn resolution(&self) -> usize {
        match self {
            Self::Low => 32,
            Self::Medium => 64,
            Self::High => 128,
        }
    }

    /// Cubic grid for this preset
    ///
    /// # Errors
    ///
    /// Never fails for the built-in presets; the `Result` comes from
    /// [`GridDimensions::cube`].
    pub fn grid_dimensions(&self) -> Result<GridDimensions> {
        GridDimensions::cube(self.resolution())
    }

    /// Parse a preset name (`low`, `medium`, `high`), ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}
