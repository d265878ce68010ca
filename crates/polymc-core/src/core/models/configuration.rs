use super::topology::TopologyKind;
use crate::core::random::mt19937::Mt19937;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LayoutError {
    #[error("The flat-mesh layout requires a mesh topology, got {0}")]
    MeshLayoutRequiresMesh(TopologyKind),
    #[error("The {layout} layout cannot place {actual} particles")]
    TooFewParticles { layout: &'static str, actual: usize },
}

/// Whether trial moves and generated configurations use the `z` axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimensionality {
    #[default]
    Planar,
    Spatial,
}

/// Starting geometry of a run that does not load a restart file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialLayout {
    /// Beads spaced by the bond length along `+x`.
    StraightChain,
    /// Fixed-length steps in random directions.
    RandomWalk,
    /// Regular polygon in the `xy` plane with chord length equal to the bond length.
    Ring,
    /// Square lattice in the `xy` plane.
    FlatMesh,
}

impl InitialLayout {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StraightChain => "straight-chain",
            Self::RandomWalk => "random-walk",
            Self::Ring => "ring",
            Self::FlatMesh => "flat-mesh",
        }
    }

    pub fn generate(
        &self,
        topology: TopologyKind,
        num_particles: usize,
        bond_length: f64,
        dimensionality: Dimensionality,
        rng: &mut Mt19937,
    ) -> Result<Vec<Vector3<f64>>, LayoutError> {
        if num_particles == 0 {
            return Err(LayoutError::TooFewParticles {
                layout: self.name(),
                actual: num_particles,
            });
        }
        match self {
            Self::StraightChain => Ok(straight_chain(num_particles, bond_length)),
            Self::RandomWalk => Ok(random_walk(num_particles, bond_length, dimensionality, rng)),
            Self::Ring => {
                if num_particles < 3 {
                    return Err(LayoutError::TooFewParticles {
                        layout: self.name(),
                        actual: num_particles,
                    });
                }
                Ok(ring(num_particles, bond_length))
            }
            Self::FlatMesh => match topology {
                TopologyKind::Mesh { side_x, side_y } => Ok(flat_mesh(side_x, side_y, bond_length)),
                other => Err(LayoutError::MeshLayoutRequiresMesh(other)),
            },
        }
    }
}

pub fn straight_chain(num_particles: usize, bond_length: f64) -> Vec<Vector3<f64>> {
    (0..num_particles)
        .map(|i| Vector3::new(i as f64 * bond_length, 0.0, 0.0))
        .collect()
}

pub fn random_walk(
    num_particles: usize,
    bond_length: f64,
    dimensionality: Dimensionality,
    rng: &mut Mt19937,
) -> Vec<Vector3<f64>> {
    let mut positions = Vec::with_capacity(num_particles);
    let mut current = Vector3::zeros();
    positions.push(current);
    for _ in 1..num_particles {
        let step = match dimensionality {
            Dimensionality::Planar => {
                let theta = 2.0 * PI * rng.next_real01_half();
                Vector3::new(theta.cos(), theta.sin(), 0.0)
            }
            Dimensionality::Spatial => {
                let z = 2.0 * rng.next_real01_half() - 1.0;
                let phi = 2.0 * PI * rng.next_real01_half();
                let rho = (1.0 - z * z).sqrt();
                Vector3::new(rho * phi.cos(), rho * phi.sin(), z)
            }
        };
        current += step * bond_length;
        positions.push(current);
    }
    positions
}

pub fn ring(num_particles: usize, bond_length: f64) -> Vec<Vector3<f64>> {
    let radius = bond_length / (2.0 * (PI / num_particles as f64).sin());
    (0..num_particles)
        .map(|i| {
            let phi = 2.0 * PI * i as f64 / num_particles as f64;
            Vector3::new(radius * phi.cos(), radius * phi.sin(), 0.0)
        })
        .collect()
}

pub fn flat_mesh(side_x: usize, side_y: usize, bond_length: f64) -> Vec<Vector3<f64>> {
    let mut positions = Vec::with_capacity(side_x * side_y);
    for y in 0..side_y {
        for x in 0..side_x {
            positions.push(Vector3::new(
                x as f64 * bond_length,
                y as f64 * bond_length,
                0.0,
            ));
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::mesh_site_id;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn straight_chain_spaces_beads_along_x() {
        let positions = straight_chain(4, 1.5);
        assert_eq!(positions[0], Vector3::zeros());
        assert_eq!(positions[3], Vector3::new(4.5, 0.0, 0.0));
    }

    #[test]
    fn planar_random_walk_has_fixed_step_length_and_no_z() {
        let mut rng = Mt19937::new(17);
        let positions = random_walk(50, 0.8, Dimensionality::Planar, &mut rng);
        assert_eq!(positions.len(), 50);
        for pair in positions.windows(2) {
            assert!(((pair[1] - pair[0]).norm() - 0.8).abs() < TOLERANCE);
            assert_eq!(pair[1].z, 0.0);
        }
    }

    #[test]
    fn spatial_random_walk_leaves_the_plane() {
        let mut rng = Mt19937::new(17);
        let positions = random_walk(50, 1.0, Dimensionality::Spatial, &mut rng);
        for pair in positions.windows(2) {
            assert!(((pair[1] - pair[0]).norm() - 1.0).abs() < TOLERANCE);
        }
        assert!(positions.iter().any(|p| p.z != 0.0));
    }

    #[test]
    fn random_walk_is_reproducible_for_a_seed() {
        let a = random_walk(20, 1.0, Dimensionality::Spatial, &mut Mt19937::new(3));
        let b = random_walk(20, 1.0, Dimensionality::Spatial, &mut Mt19937::new(3));
        assert_eq!(a, b);
    }

    #[test]
    fn ring_neighbours_are_one_bond_length_apart() {
        let positions = ring(8, 1.0);
        for i in 0..8 {
            let d = (positions[(i + 1) % 8] - positions[i]).norm();
            assert!((d - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn flat_mesh_follows_lattice_ids() {
        let positions = flat_mesh(4, 3, 2.0);
        assert_eq!(positions.len(), 12);
        assert_eq!(positions[mesh_site_id(3, 2, 4, 3)], Vector3::new(6.0, 4.0, 0.0));
    }

    #[test]
    fn flat_mesh_layout_requires_mesh_topology() {
        let mut rng = Mt19937::new(1);
        let result = InitialLayout::FlatMesh.generate(
            TopologyKind::Chain,
            9,
            1.0,
            Dimensionality::Planar,
            &mut rng,
        );
        assert_eq!(
            result,
            Err(LayoutError::MeshLayoutRequiresMesh(TopologyKind::Chain))
        );
    }

    #[test]
    fn ring_layout_needs_three_particles() {
        let mut rng = Mt19937::new(1);
        let result =
            InitialLayout::Ring.generate(TopologyKind::Ring, 2, 1.0, Dimensionality::Planar, &mut rng);
        assert!(matches!(result, Err(LayoutError::TooFewParticles { .. })));
    }
}
