use nalgebra::Vector3;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Common interface for files that store a bare particle position set.
pub trait ConfigurationFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    fn read_from(reader: &mut impl Read) -> Result<Vec<Vector3<f64>>, Self::Error>;

    fn write_to(positions: &[Vector3<f64>], writer: &mut impl Write) -> Result<(), Self::Error>;

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Vector3<f64>>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn write_to_path<P: AsRef<Path>>(
        positions: &[Vector3<f64>],
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(positions, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
