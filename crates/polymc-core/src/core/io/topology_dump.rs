use crate::core::models::topology::Topology;
use std::io::{self, Write};

/// Plain-text listing of every bond and angle, used for debugging a run setup.
pub fn write_topology(writer: &mut impl Write, topology: &Topology) -> io::Result<()> {
    writeln!(writer, "# Bond topology.")?;
    for bond in topology.bonds() {
        writeln!(writer, "{} {}", bond.i0, bond.i1)?;
    }
    writeln!(writer, "# Angle topology.")?;
    for angle in topology.angles() {
        writeln!(writer, "{} {} {}", angle.i0, angle.i1, angle.i2)?;
    }
    Ok(())
}
