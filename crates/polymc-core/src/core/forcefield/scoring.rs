use super::params::ForcefieldParams;
use super::potentials;
use super::term::EnergyTerm;
use crate::core::geometry::boundary::Boundary;
use crate::core::models::adjacency::AdjacencyIndex;
use crate::core::models::topology::{Angle, Bond, Topology};
use nalgebra::{Matrix3, Vector3};

/// Evaluates bonded energies and virials of a position set.
///
/// All particle ids are assumed valid for `positions`; topology construction
/// guarantees this for any state built through [`crate::core::models::system`].
pub struct Scorer<'a> {
    params: &'a ForcefieldParams,
    boundary: &'a Boundary,
}

impl<'a> Scorer<'a> {
    pub fn new(params: &'a ForcefieldParams, boundary: &'a Boundary) -> Self {
        Self { params, boundary }
    }

    #[inline]
    pub fn bond_energy(&self, positions: &[Vector3<f64>], bond: &Bond) -> f64 {
        potentials::bond_energy(
            &positions[bond.i0],
            &positions[bond.i1],
            self.params.k_bond,
            self.params.rest_length(),
            self.boundary,
        )
    }

    #[inline]
    pub fn angle_energy(&self, positions: &[Vector3<f64>], angle: &Angle) -> f64 {
        potentials::angle_energy(
            &positions[angle.i0],
            &positions[angle.i1],
            &positions[angle.i2],
            self.params.k_angle,
            self.boundary,
        )
    }

    /// Energy of every term that involves `particle`.
    pub fn local_energy(
        &self,
        positions: &[Vector3<f64>],
        adjacency: &AdjacencyIndex,
        particle: usize,
    ) -> EnergyTerm {
        let bond = adjacency
            .bonds_of(particle)
            .iter()
            .map(|b| self.bond_energy(positions, b))
            .sum();
        let angle = adjacency
            .angles_of(particle)
            .iter()
            .map(|a| self.angle_energy(positions, a))
            .sum();
        EnergyTerm::new(bond, angle)
    }

    pub fn total_energy(&self, positions: &[Vector3<f64>], topology: &Topology) -> EnergyTerm {
        let bond = topology
            .bonds()
            .iter()
            .map(|b| self.bond_energy(positions, b))
            .sum();
        let angle = topology
            .angles()
            .iter()
            .map(|a| self.angle_energy(positions, a))
            .sum();
        EnergyTerm::new(bond, angle)
    }

    pub fn total_virial(&self, positions: &[Vector3<f64>], topology: &Topology) -> Matrix3<f64> {
        let mut virial = Matrix3::zeros();
        for bond in topology.bonds() {
            virial += potentials::bond_virial(
                &positions[bond.i0],
                &positions[bond.i1],
                self.params.k_bond,
                self.params.rest_length(),
                self.boundary,
            );
        }
        for angle in topology.angles() {
            virial += potentials::angle_virial(
                &positions[angle.i0],
                &positions[angle.i1],
                &positions[angle.i2],
                self.params.k_angle,
                self.boundary,
            );
        }
        virial
    }
}
