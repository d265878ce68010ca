use super::topology::{Angle, Bond, Topology, TopologyError};
use smallvec::SmallVec;

type BondSlots = SmallVec<[Bond; 4]>;
type AngleSlots = SmallVec<[Angle; 6]>;

/// Per-particle lists of the bonds and angles a particle takes part in.
///
/// Each term is registered once under every particle it touches, so moving a
/// single particle only requires re-evaluating the terms listed under it.
#[derive(Debug, Clone)]
pub struct AdjacencyIndex {
    bond_capacity: usize,
    angle_capacity: usize,
    bonds: Vec<BondSlots>,
    angles: Vec<AngleSlots>,
}

impl AdjacencyIndex {
    pub fn build(topology: &Topology) -> Result<Self, TopologyError> {
        let n = topology.num_particles();
        let kind = topology.kind();
        let mut index = Self {
            bond_capacity: kind.bond_capacity(),
            angle_capacity: kind.angle_capacity(),
            bonds: vec![BondSlots::new(); n],
            angles: vec![AngleSlots::new(); n],
        };

        for bond in topology.bonds() {
            for particle in bond.particles() {
                index.register_bond(particle, *bond)?;
            }
        }
        for angle in topology.angles() {
            for particle in angle.particles() {
                index.register_angle(particle, *angle)?;
            }
        }

        Ok(index)
    }

    fn register_bond(&mut self, particle: usize, bond: Bond) -> Result<(), TopologyError> {
        let count = self.bonds.len();
        let slots = self
            .bonds
            .get_mut(particle)
            .ok_or(TopologyError::ParticleOutOfRange { particle, count })?;
        if slots.len() >= self.bond_capacity {
            return Err(TopologyError::CapacityExceeded {
                particle,
                what: "bond",
                capacity: self.bond_capacity,
            });
        }
        slots.push(bond);
        Ok(())
    }

    fn register_angle(&mut self, particle: usize, angle: Angle) -> Result<(), TopologyError> {
        let count = self.angles.len();
        let slots = self
            .angles
            .get_mut(particle)
            .ok_or(TopologyError::ParticleOutOfRange { particle, count })?;
        if slots.len() >= self.angle_capacity {
            return Err(TopologyError::CapacityExceeded {
                particle,
                what: "angle",
                capacity: self.angle_capacity,
            });
        }
        slots.push(angle);
        Ok(())
    }

    #[inline]
    pub fn num_particles(&self) -> usize {
        self.bonds.len()
    }

    #[inline]
    pub fn bonds_of(&self, particle: usize) -> &[Bond] {
        &self.bonds[particle]
    }

    #[inline]
    pub fn angles_of(&self, particle: usize) -> &[Angle] {
        &self.angles[particle]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::boundary::Boundary;
    use nalgebra::Vector3;

    fn assert_index_is_consistent(topology: &Topology, index: &AdjacencyIndex) {
        let n = topology.num_particles();
        let bond_refs: usize = (0..n).map(|p| index.bonds_of(p).len()).sum();
        let angle_refs: usize = (0..n).map(|p| index.angles_of(p).len()).sum();
        assert_eq!(bond_refs, 2 * topology.bonds().len());
        assert_eq!(angle_refs, 3 * topology.angles().len());

        for p in 0..n {
            assert!(index.bonds_of(p).iter().all(|b| b.contains(p)));
            assert!(index.angles_of(p).iter().all(|a| a.contains(p)));
        }
    }

    #[test]
    fn chain_interior_and_end_particles_have_expected_terms() {
        let topology = Topology::chain(6, false).unwrap();
        let index = AdjacencyIndex::build(&topology).unwrap();
        assert_index_is_consistent(&topology, &index);

        assert_eq!(index.bonds_of(0).len(), 1);
        assert_eq!(index.angles_of(0).len(), 1);
        assert_eq!(index.bonds_of(1).len(), 2);
        assert_eq!(index.angles_of(1).len(), 2);
        assert_eq!(index.bonds_of(3).len(), 2);
        assert_eq!(index.angles_of(3).len(), 3);
        assert_eq!(index.bonds_of(5).len(), 1);
    }

    #[test]
    fn ring_particles_are_all_equivalent() {
        let topology = Topology::chain(7, true).unwrap();
        let index = AdjacencyIndex::build(&topology).unwrap();
        assert_index_is_consistent(&topology, &index);
        for p in 0..7 {
            assert_eq!(index.bonds_of(p).len(), 2);
            assert_eq!(index.angles_of(p).len(), 3);
        }
    }

    #[test]
    fn smallest_ring_fits_capacity() {
        let topology = Topology::chain(3, true).unwrap();
        let index = AdjacencyIndex::build(&topology).unwrap();
        assert_index_is_consistent(&topology, &index);
    }

    #[test]
    fn mesh_sites_have_four_bonds_and_six_angles() {
        let boundary = Boundary::periodic(Vector3::new(10.0, 10.0, 0.0)).unwrap();
        let topology = Topology::mesh(4, 5, &boundary).unwrap();
        let index = AdjacencyIndex::build(&topology).unwrap();
        assert_index_is_consistent(&topology, &index);
        for p in 0..topology.num_particles() {
            assert_eq!(index.bonds_of(p).len(), 4);
            assert_eq!(index.angles_of(p).len(), 6);
        }
    }

    #[test]
    fn registration_order_follows_topology_order() {
        let topology = Topology::chain(4, false).unwrap();
        let index = AdjacencyIndex::build(&topology).unwrap();
        assert_eq!(index.bonds_of(1), &[Bond::new(0, 1), Bond::new(1, 2)]);
        assert_eq!(
            index.angles_of(2),
            &[Angle::new(0, 1, 2), Angle::new(1, 2, 3)]
        );
    }

    #[test]
    fn overflowing_a_slot_is_an_invariant_error() {
        let topology = Topology::chain(4, false).unwrap();
        let mut index = AdjacencyIndex::build(&topology).unwrap();
        assert_eq!(
            index.register_bond(1, Bond::new(1, 3)),
            Err(TopologyError::CapacityExceeded {
                particle: 1,
                what: "bond",
                capacity: 2,
            })
        );
    }

    #[test]
    fn out_of_range_particle_is_an_invariant_error() {
        let topology = Topology::chain(4, false).unwrap();
        let mut index = AdjacencyIndex::build(&topology).unwrap();
        assert_eq!(
            index.register_angle(9, Angle::new(7, 8, 9)),
            Err(TopologyError::ParticleOutOfRange {
                particle: 9,
                count: 4
            })
        );
    }
}
