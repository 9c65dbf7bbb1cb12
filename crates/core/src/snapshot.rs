//! Half-precision density snapshots
//!
//! A snapshot is a flat, headerless blob of little-endian IEEE-754 binary16
//! values, one per cell, in field storage order. Only scalar fields can be
//! saved or loaded.

use std::fs;
use std::io::Write;
use std::path::Path;

use half::f16;

use crate::error::{Result, SimulationError};
use crate::field::VolumetricField;

/// Bytes per stored value
const BYTES_PER_VALUE: usize = 2;

fn require_scalar(field: &VolumetricField) -> Result<()> {
    if field.components() == 1 {
        Ok(())
    } else {
        Err(SimulationError::config(format!(
            "snapshots hold scalar fields, got {} components",
            field.components()
        )))
    }
}

/// Expected snapshot size in bytes for a scalar field
pub fn expected_len(field: &VolumetricField) -> u64 {
    (field.dimensions().cell_count() * BYTES_PER_VALUE) as u64
}

/// Write `field` to `path`
///
/// Values are rounded to half precision.
///
/// # Errors
///
/// - [`SimulationError::Configuration`] if `field` is not scalar
/// - [`SimulationError::SnapshotIo`] if the file cannot be created or written
pub fn save<P: AsRef<Path>>(path: P, field: &VolumetricField) -> Result<()> {
    let path = path.as_ref();
    require_scalar(field)?;

    let bytes: Vec<u8> = field
        .as_slice()
        .iter()
        .flat_map(|&v| f16::from_f32(v).to_le_bytes())
        .collect();

    let io_error = |source| SimulationError::SnapshotIo {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(path).map_err(io_error)?;
    file.write_all(&bytes).map_err(io_error)?;
    file.flush().map_err(io_error)?;
    Ok(())
}

/// Replace the contents of `field` with the snapshot at `path`
///
/// The file is fully read and decoded before `field` is touched, so any
/// error leaves the field unchanged.
///
/// # Errors
///
/// - [`SimulationError::Configuration`] if `field` is not scalar
/// - [`SimulationError::SnapshotIo`] if the file is missing or unreadable
/// - [`SimulationError::SnapshotSize`] if the file is not exactly
///   `width * height * depth * 2` bytes
pub fn load<P: AsRef<Path>>(path: P, field: &mut VolumetricField) -> Result<()> {
    let path = path.as_ref();
    require_scalar(field)?;

    let expected = expected_len(field);
    let io_error = |source| SimulationError::SnapshotIo {
        path: path.to_path_buf(),
        source,
    };
    let size_error = |actual| SimulationError::SnapshotSize {
        path: path.to_path_buf(),
        expected,
        actual,
    };

    let actual = fs::metadata(path).map_err(io_error)?.len();
    if actual != expected {
        return Err(size_error(actual));
    }
    let bytes = fs::read(path).map_err(io_error)?;
    if bytes.len() as u64 != expected {
        return Err(size_error(bytes.len() as u64));
    }

    let decoded: Vec<f32> = bytes
        .chunks_exact(BYTES_PER_VALUE)
        .map(|pair| f16::from_le_bytes([pair[0], pair[1]]).to_f32())
        .collect();
    field.as_mut_slice().copy_from_slice(&decoded);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::GridDimensions;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("smoke-sim-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_round_trip_of_representable_values() {
        let dims = GridDimensions::new(4, 3, 2).unwrap();
        let mut field = VolumetricField::new(dims, 1).unwrap();
        field.set(1, 2, 1, 0, 0.5);
        field.set(3, 0, 0, 0, 1.25);
        field.set(0, 1, 1, 0, -2.0);

        let path = temp_path("round-trip.raw");
        save(&path, &field).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 4 * 3 * 2 * 2);

        let mut restored = VolumetricField::filled(dims, 1, 9.0).unwrap();
        load(&path, &mut restored).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(restored, field);
    }

    #[test]
    fn test_values_are_rounded_to_half() {
        let dims = GridDimensions::cube(2).unwrap();
        let field = VolumetricField::filled(dims, 1, 0.1).unwrap();
        let path = temp_path("rounding.raw");
        save(&path, &field).unwrap();

        let mut restored = VolumetricField::new(dims, 1).unwrap();
        load(&path, &mut restored).unwrap();
        fs::remove_file(&path).unwrap();

        let expected = f16::from_f32(0.1).to_f32();
        assert!(restored.as_slice().iter().all(|&v| v == expected));
    }

    #[test]
    fn test_vector_fields_are_rejected() {
        let dims = GridDimensions::cube(2).unwrap();
        let field = VolumetricField::new(dims, 3).unwrap();
        let err = save(temp_path("vector.raw"), &field).unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
    }

    #[test]
    fn test_missing_file() {
        let dims = GridDimensions::cube(2).unwrap();
        let mut field = VolumetricField::new(dims, 1).unwrap();
        let err = load(temp_path("does-not-exist.raw"), &mut field).unwrap_err();
        assert!(matches!(err, SimulationError::SnapshotIo { .. }));
    }
}
