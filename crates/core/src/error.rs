//! Error taxonomy for the smoke simulation core
//!
//! Every failure the crate reports is a startup or persistence failure. The
//! per-frame step has no recoverable error path: passes panic on programming
//! errors (mismatched field shapes) and otherwise cannot fail.

use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by field creation, configuration, and snapshot I/O
#[derive(Debug)]
pub enum SimulationError {
    /// Grid dimensions, component counts, or simulation parameters are invalid
    Configuration(String),
    /// Backing storage for a field could not be sized or reserved
    ResourceAllocation {
        /// Number of cells requested
        cells: usize,
        /// Components per cell requested
        components: usize,
    },
    /// A snapshot file could not be opened, read, or written
    SnapshotIo {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },
    /// A snapshot file does not hold exactly one half-float per cell
    SnapshotSize {
        /// File that failed
        path: PathBuf,
        /// Expected size in bytes (`width * height * depth * 2`)
        expected: u64,
        /// Size found on disk
        actual: u64,
    },
}

impl SimulationError {
    /// Shorthand for a [`SimulationError::Configuration`] with a formatted message
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Configuration(msg) => write!(f, "Invalid configuration: {msg}"),
            SimulationError::ResourceAllocation { cells, components } => write!(
                f,
                "Failed to allocate field storage for {cells} cells x {components} components"
            ),
            SimulationError::SnapshotIo { path, source } => {
                write!(f, "Snapshot I/O failed for '{}': {source}", path.display())
            }
            SimulationError::SnapshotSize {
                path,
                expected,
                actual,
            } => write!(
                f,
                "Snapshot '{}' has {actual} bytes, expected exactly {expected}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::SnapshotIo { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimulationError>;
