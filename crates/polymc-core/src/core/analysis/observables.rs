use crate::core::geometry::boundary::Boundary;
use crate::core::models::topology::Topology;
use nalgebra::{Matrix3, Vector3};

/// Lengths of every bond in topology order.
pub fn bond_lengths(
    positions: &[Vector3<f64>],
    topology: &Topology,
    boundary: &Boundary,
) -> Vec<f64> {
    topology
        .bonds()
        .iter()
        .map(|b| boundary.distance(&positions[b.i0], &positions[b.i1]))
        .collect()
}

/// Plain arithmetic mean of the stored (wrapped) coordinates.
pub fn center_of_mass(positions: &[Vector3<f64>]) -> Vector3<f64> {
    if positions.is_empty() {
        return Vector3::zeros();
    }
    positions.iter().sum::<Vector3<f64>>() / positions.len() as f64
}

/// Radius of gyration about [`center_of_mass`], with minimum-image distances.
pub fn radius_of_gyration(positions: &[Vector3<f64>], boundary: &Boundary) -> f64 {
    if positions.is_empty() {
        return 0.0;
    }
    let com = center_of_mass(positions);
    let sum: f64 = positions
        .iter()
        .map(|p| boundary.squared_distance(&com, p))
        .sum();
    (sum / positions.len() as f64).sqrt()
}

/// Distance between the first and the last particle.
pub fn end_to_end_distance(positions: &[Vector3<f64>], boundary: &Boundary) -> f64 {
    match (positions.first(), positions.last()) {
        (Some(first), Some(last)) => boundary.distance(first, last),
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMean {
    sum: f64,
    count: u64,
}

impl RunningMean {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorMean {
    sum: Matrix3<f64>,
    count: u64,
}

impl Default for TensorMean {
    fn default() -> Self {
        Self {
            sum: Matrix3::zeros(),
            count: 0,
        }
    }
}

impl TensorMean {
    pub fn push(&mut self, value: &Matrix3<f64>) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<Matrix3<f64>> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
