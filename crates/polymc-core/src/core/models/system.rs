use super::adjacency::AdjacencyIndex;
use super::topology::{Topology, TopologyError};
use crate::core::geometry::boundary::Boundary;
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum StateError {
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),
    #[error("Position count {positions} does not match topology particle count {particles}")]
    PositionCountMismatch { positions: usize, particles: usize },
    #[error("Particle {particle} has a non-finite coordinate")]
    NonFinitePosition { particle: usize },
}

/// Everything the move engine mutates or reads, owned in one place.
///
/// Positions are only ever changed one particle at a time through
/// [`SimulationState::set_position`]; topology, adjacency and boundary are fixed
/// at construction.
#[derive(Debug, Clone)]
pub struct SimulationState {
    positions: Vec<Vector3<f64>>,
    topology: Topology,
    adjacency: AdjacencyIndex,
    boundary: Boundary,
    acceptance_ratio: f64,
}

impl SimulationState {
    pub fn new(
        positions: Vec<Vector3<f64>>,
        topology: Topology,
        boundary: Boundary,
    ) -> Result<Self, StateError> {
        if positions.len() != topology.num_particles() {
            return Err(StateError::PositionCountMismatch {
                positions: positions.len(),
                particles: topology.num_particles(),
            });
        }
        if let Some(particle) = first_non_finite(&positions) {
            return Err(StateError::NonFinitePosition { particle });
        }
        let adjacency = AdjacencyIndex::build(&topology)?;
        let positions = positions.iter().map(|p| boundary.wrap(p)).collect();

        Ok(Self {
            positions,
            topology,
            adjacency,
            boundary,
            acceptance_ratio: 0.0,
        })
    }

    #[inline]
    pub fn num_particles(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    #[inline]
    pub fn position(&self, particle: usize) -> Option<&Vector3<f64>> {
        self.positions.get(particle)
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    #[inline]
    pub fn acceptance_ratio(&self) -> f64 {
        self.acceptance_ratio
    }

    #[inline]
    pub(crate) fn adjacency(&self) -> &AdjacencyIndex {
        &self.adjacency
    }

    #[inline]
    pub(crate) fn set_position(&mut self, particle: usize, position: Vector3<f64>) {
        self.positions[particle] = position;
    }

    #[inline]
    pub(crate) fn set_acceptance_ratio(&mut self, ratio: f64) {
        self.acceptance_ratio = ratio;
    }

    /// Replaces the leading positions with `loaded`, keeping any extras.
    ///
    /// Returns how many positions were overwritten. Nothing is changed if a
    /// copied position has a non-finite coordinate.
    pub(crate) fn overwrite_positions(
        &mut self,
        loaded: &[Vector3<f64>],
    ) -> Result<usize, StateError> {
        let count = loaded.len().min(self.positions.len());
        if let Some(particle) = first_non_finite(&loaded[..count]) {
            return Err(StateError::NonFinitePosition { particle });
        }
        for (slot, p) in self.positions.iter_mut().zip(loaded) {
            *slot = self.boundary.wrap(p);
        }
        Ok(count)
    }
}

fn first_non_finite(positions: &[Vector3<f64>]) -> Option<usize> {
    positions
        .iter()
        .position(|p| !p.iter().all(|c| c.is_finite()))
}
