use super::traits::ConfigurationFile;
use crate::core::models::system::{SimulationState, StateError};
use nalgebra::Vector3;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RestartError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Restart file declares a negative particle count: {0}")]
    NegativeCount(i32),
    #[error("Too many particles for the restart format: {0}")]
    TooManyParticles(usize),
    #[error("Invalid restart positions: {0}")]
    State(#[from] StateError),
}

/// Upper bound on the positions reserved up front; the declared count is not
/// trusted until the records are actually read.
const MAX_PREALLOCATED: usize = 4096;

/// Binary restart format: a little-endian `i32` particle count followed by
/// that many `(x, y, z)` triples of little-endian `f64`.
pub struct RestartFile;

impl ConfigurationFile for RestartFile {
    type Error = RestartError;

    fn read_from(reader: &mut impl Read) -> Result<Vec<Vector3<f64>>, Self::Error> {
        let mut count_bytes = [0u8; 4];
        reader.read_exact(&mut count_bytes)?;
        let count = i32::from_le_bytes(count_bytes);
        if count < 0 {
            return Err(RestartError::NegativeCount(count));
        }

        let mut positions = Vec::with_capacity((count as usize).min(MAX_PREALLOCATED));
        let mut record = [0u8; 24];
        for _ in 0..count {
            reader.read_exact(&mut record)?;
            let mut coords = [0.0f64; 3];
            for (axis, chunk) in record.chunks_exact(8).enumerate() {
                let mut word = [0u8; 8];
                word.copy_from_slice(chunk);
                coords[axis] = f64::from_le_bytes(word);
            }
            positions.push(Vector3::new(coords[0], coords[1], coords[2]));
        }
        Ok(positions)
    }

    fn write_to(positions: &[Vector3<f64>], writer: &mut impl Write) -> Result<(), Self::Error> {
        let count = i32::try_from(positions.len())
            .map_err(|_| RestartError::TooManyParticles(positions.len()))?;
        writer.write_all(&count.to_le_bytes())?;
        for p in positions {
            writer.write_all(&p.x.to_le_bytes())?;
            writer.write_all(&p.y.to_le_bytes())?;
            writer.write_all(&p.z.to_le_bytes())?;
        }
        Ok(())
    }
}

/// Loads a restart file into `state`.
///
/// A particle-count mismatch is reported with a warning only; the overlapping
/// prefix is copied and the remaining positions keep their current values.
pub fn load_into(path: &Path, state: &mut SimulationState) -> Result<usize, RestartError> {
    let loaded = RestartFile::read_from_path(path)?;
    if loaded.len() != state.num_particles() {
        warn!(
            "Restart file {:?} holds {} particles but the system has {}; copying the first {}.",
            path,
            loaded.len(),
            state.num_particles(),
            loaded.len().min(state.num_particles())
        );
    }
    let copied = state.overwrite_positions(&loaded)?;
    info!("Loaded {} positions from restart file {:?}.", copied, path);
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::boundary::Boundary;
    use crate::core::models::topology::Topology;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn sample_positions() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(0.5, -1.25, 3.0),
            Vector3::new(1e-300, 7.0, -0.0),
            Vector3::new(123.456, 0.0, 9.75),
        ]
    }

    #[test]
    fn written_layout_is_count_then_little_endian_triples() {
        let mut buffer = Vec::new();
        RestartFile::write_to(&sample_positions(), &mut buffer).unwrap();
        assert_eq!(buffer.len(), 4 + 3 * 24);
        assert_eq!(&buffer[..4], &3i32.to_le_bytes());
        assert_eq!(&buffer[4..12], &0.5f64.to_le_bytes());
        assert_eq!(&buffer[12..20], &(-1.25f64).to_le_bytes());
    }

    #[test]
    fn file_round_trip_preserves_bits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fin_config.bin");
        RestartFile::write_to_path(&sample_positions(), &path).unwrap();
        let loaded = RestartFile::read_from_path(&path).unwrap();
        assert_eq!(loaded, sample_positions());
    }

    #[test]
    fn truncated_file_is_an_io_error() {
        let mut buffer = Vec::new();
        RestartFile::write_to(&sample_positions(), &mut buffer).unwrap();
        buffer.truncate(buffer.len() - 5);
        let result = RestartFile::read_from(&mut Cursor::new(buffer));
        assert!(matches!(result, Err(RestartError::Io(_))));
    }

    #[test]
    fn oversized_count_header_without_records_is_an_io_error() {
        let buffer = i32::MAX.to_le_bytes().to_vec();
        let result = RestartFile::read_from(&mut Cursor::new(buffer));
        assert!(matches!(result, Err(RestartError::Io(_))));
    }

    #[test]
    fn negative_count_is_rejected() {
        let buffer = (-2i32).to_le_bytes().to_vec();
        let result = RestartFile::read_from(&mut Cursor::new(buffer));
        assert!(matches!(result, Err(RestartError::NegativeCount(-2))));
    }

    #[test]
    fn load_into_copies_prefix_on_count_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.bin");
        RestartFile::write_to_path(&sample_positions()[..2], &path).unwrap();

        let topology = Topology::chain(4, false).unwrap();
        let positions = (0..4).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
        let mut state = SimulationState::new(positions, topology, Boundary::free()).unwrap();

        let copied = load_into(&path, &mut state).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(state.positions()[0], sample_positions()[0]);
        assert_eq!(state.positions()[3], Vector3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn load_into_rejects_nan_coordinates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nan.bin");
        let mut positions = sample_positions();
        positions[0].x = f64::NAN;
        RestartFile::write_to_path(&positions, &path).unwrap();

        let topology = Topology::chain(3, false).unwrap();
        let original: Vec<_> = (0..3).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
        let mut state =
            SimulationState::new(original.clone(), topology, Boundary::free()).unwrap();

        let result = load_into(&path, &mut state);
        assert!(matches!(
            result,
            Err(RestartError::State(StateError::NonFinitePosition { particle: 0 }))
        ));
        assert_eq!(state.positions(), original.as_slice());
    }
}
