//! Core types shared by every field and pass

pub mod grid;
pub mod vec3;

pub use grid::GridDimensions;
pub use vec3::Vec3;
