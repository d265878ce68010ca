use nalgebra::Vector3;
use std::io::{self, Write};

const ELEMENT: &str = "C";

/// Appends one XYZ frame: particle count, a `mcsteps = <sweep>` comment line,
/// then one `C x y z` line per particle.
pub fn write_frame(
    writer: &mut impl Write,
    sweep: u64,
    positions: &[Vector3<f64>],
) -> io::Result<()> {
    writeln!(writer, "{}", positions.len())?;
    writeln!(writer, "mcsteps = {}", sweep)?;
    for p in positions {
        writeln!(writer, "{} {} {} {}", ELEMENT, p.x, p.y, p.z)?;
    }
    Ok(())
}
