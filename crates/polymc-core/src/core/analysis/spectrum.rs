use crate::core::geometry::boundary::Boundary;
use crate::core::models::topology::TopologyKind;
use nalgebra::{Complex, Vector3};
use std::f64::consts::PI;

pub const LINE_DIVISIONS: usize = 100;
pub const SHEET_DIVISIONS: usize = 50;

/// Height-fluctuation spectrum of a periodic polymer.
///
/// Chains and rings are treated as a line along `x` with height `y`; meshes as
/// a sheet in `xy` with height `z`. Each sample adds `|f̃(q)|²`, where
/// `f̃(q) = Σ_j h_j exp(-i q·r_j)`, and [`FluctuationSpectrum::spectrum`]
/// returns the sample mean scaled by `1 / area`.
#[derive(Debug, Clone)]
pub struct FluctuationSpectrum {
    geometry: SpectrumGeometry,
    qx: Vec<f64>,
    qy: Vec<f64>,
    power_sum: Vec<f64>,
    norm: f64,
    samples: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpectrumGeometry {
    Line,
    Sheet,
}

fn wave_numbers(box_length: f64, bond_length: f64, divisions: usize) -> Vec<f64> {
    let q_low = 1.0 / (PI * box_length);
    let q_up = 1.0 / (PI * bond_length);
    let dq = (q_up - q_low) / divisions as f64;
    (0..divisions).map(|i| (i as f64 + 0.5) * dq).collect()
}

impl FluctuationSpectrum {
    /// `None` unless the boundary is periodic.
    pub fn new(topology: TopologyKind, boundary: &Boundary, bond_length: f64) -> Option<Self> {
        if !boundary.is_periodic() || bond_length <= 0.0 {
            return None;
        }
        let box_length = boundary.box_length();
        let (geometry, qx, qy, norm) = match topology {
            TopologyKind::Chain | TopologyKind::Ring => (
                SpectrumGeometry::Line,
                wave_numbers(box_length.x, bond_length, LINE_DIVISIONS),
                vec![0.0],
                1.0 / box_length.x,
            ),
            TopologyKind::Mesh { .. } => (
                SpectrumGeometry::Sheet,
                wave_numbers(box_length.x, bond_length, SHEET_DIVISIONS),
                wave_numbers(box_length.y, bond_length, SHEET_DIVISIONS),
                1.0 / (box_length.x * box_length.y),
            ),
        };
        let bins = qx.len() * qy.len();
        Some(Self {
            geometry,
            qx,
            qy,
            power_sum: vec![0.0; bins],
            norm,
            samples: 0,
        })
    }

    fn amplitude(&self, positions: &[Vector3<f64>], qx: f64, qy: f64) -> Complex<f64> {
        positions
            .iter()
            .map(|p| {
                let (height, phase) = match self.geometry {
                    SpectrumGeometry::Line => (p.y, qx * p.x),
                    SpectrumGeometry::Sheet => (p.z, qx * p.x + qy * p.y),
                };
                Complex::from_polar(height, -phase)
            })
            .sum()
    }

    pub fn accumulate(&mut self, positions: &[Vector3<f64>]) {
        let mut bin = 0;
        for iy in 0..self.qy.len() {
            for ix in 0..self.qx.len() {
                let amplitude = self.amplitude(positions, self.qx[ix], self.qy[iy]);
                self.power_sum[bin] += amplitude.norm_sqr();
                bin += 1;
            }
        }
        self.samples += 1;
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// `(|q|, S(q))` rows, x-fastest for sheets.
    pub fn spectrum(&self) -> Vec<(f64, f64)> {
        if self.samples == 0 {
            return Vec::new();
        }
        let scale = self.norm / self.samples as f64;
        let mut rows = Vec::with_capacity(self.power_sum.len());
        let mut bin = 0;
        for &qy in &self.qy {
            for &qx in &self.qx {
                let q_norm = (qx * qx + qy * qy).sqrt();
                rows.push((q_norm, self.power_sum[bin] * scale));
                bin += 1;
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn periodic(x: f64, y: f64) -> Boundary {
        Boundary::periodic(Vector3::new(x, y, 0.0)).unwrap()
    }

    #[test]
    fn free_boundary_has_no_spectrum() {
        assert!(FluctuationSpectrum::new(TopologyKind::Ring, &Boundary::free(), 1.0).is_none());
    }

    #[test]
    fn line_spectrum_uses_midpoint_wave_numbers() {
        let spectrum = FluctuationSpectrum::new(TopologyKind::Ring, &periodic(10.0, 10.0), 1.0)
            .unwrap();
        let dq = (1.0 / PI - 1.0 / (10.0 * PI)) / LINE_DIVISIONS as f64;
        assert_eq!(spectrum.qx.len(), LINE_DIVISIONS);
        assert!((spectrum.qx[0] - 0.5 * dq).abs() < TOLERANCE);
        assert!((spectrum.qx[99] - 99.5 * dq).abs() < TOLERANCE);
    }

    #[test]
    fn flat_line_has_zero_spectrum() {
        let mut spectrum =
            FluctuationSpectrum::new(TopologyKind::Chain, &periodic(10.0, 10.0), 1.0).unwrap();
        let positions: Vec<_> = (0..10).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
        spectrum.accumulate(&positions);
        assert!(spectrum.spectrum().iter().all(|(_, s)| s.abs() < TOLERANCE));
    }

    #[test]
    fn single_displaced_bead_gives_flat_power() {
        let mut spectrum =
            FluctuationSpectrum::new(TopologyKind::Ring, &periodic(4.0, 4.0), 1.0).unwrap();
        let mut positions: Vec<_> = (0..4).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
        positions[2].y = 2.0;
        spectrum.accumulate(&positions);
        spectrum.accumulate(&positions);
        // |f̃|² = h² for one bead, scaled by 1 / Lx.
        for (_, s) in spectrum.spectrum() {
            assert!((s - 1.0).abs() < TOLERANCE);
        }
        assert_eq!(spectrum.samples(), 2);
    }

    #[test]
    fn sheet_spectrum_covers_the_full_grid() {
        let mut spectrum = FluctuationSpectrum::new(
            TopologyKind::Mesh {
                side_x: 3,
                side_y: 3,
            },
            &periodic(3.0, 3.0),
            1.0,
        )
        .unwrap();
        let mut positions = vec![Vector3::zeros(); 9];
        positions[4].z = 1.0;
        spectrum.accumulate(&positions);
        let rows = spectrum.spectrum();
        assert_eq!(rows.len(), SHEET_DIVISIONS * SHEET_DIVISIONS);
        for (_, s) in rows {
            assert!((s - 1.0 / 9.0).abs() < TOLERANCE);
        }
    }
}
