use crate::core::geometry::boundary::Boundary;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TopologyError {
    #[error("A {kind} topology needs at least {min} particles, got {actual}")]
    TooFewParticles {
        kind: &'static str,
        min: usize,
        actual: usize,
    },
    #[error("Mesh sides must both be at least 3, got {side_x} x {side_y}")]
    LatticeTooSmall { side_x: usize, side_y: usize },
    #[error("A mesh topology requires a periodic boundary")]
    MeshRequiresPeriodic,
    #[error("Mesh of {side_x} x {side_y} sites does not match particle count {particles}")]
    ParticleCountMismatch {
        side_x: usize,
        side_y: usize,
        particles: usize,
    },
    #[error("Particle {particle} is outside the valid range [0, {count})")]
    ParticleOutOfRange { particle: usize, count: usize },
    #[error("Particle {particle} exceeds its {what} capacity of {capacity}")]
    CapacityExceeded {
        particle: usize,
        what: &'static str,
        capacity: usize,
    },
}

/// Connectivity pattern of the polymer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyKind {
    Chain,
    Ring,
    Mesh { side_x: usize, side_y: usize },
}

impl TopologyKind {
    /// Maximum number of bonds a single particle can take part in.
    pub const fn bond_capacity(&self) -> usize {
        match self {
            Self::Chain | Self::Ring => 2,
            Self::Mesh { .. } => 4,
        }
    }

    /// Maximum number of angle triples a single particle can take part in.
    pub const fn angle_capacity(&self) -> usize {
        match self {
            Self::Chain | Self::Ring => 3,
            Self::Mesh { .. } => 12,
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chain => write!(f, "chain"),
            Self::Ring => write!(f, "ring"),
            Self::Mesh { side_x, side_y } => write!(f, "mesh({side_x}x{side_y})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub i0: usize,
    pub i1: usize,
}

impl Bond {
    pub fn new(i0: usize, i1: usize) -> Self {
        Self { i0, i1 }
    }

    pub fn contains(&self, particle: usize) -> bool {
        self.i0 == particle || self.i1 == particle
    }

    pub fn particles(&self) -> [usize; 2] {
        [self.i0, self.i1]
    }
}

/// Bending triple; `i1` is the vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Angle {
    pub i0: usize,
    pub i1: usize,
    pub i2: usize,
}

impl Angle {
    pub fn new(i0: usize, i1: usize, i2: usize) -> Self {
        Self { i0, i1, i2 }
    }

    pub fn contains(&self, particle: usize) -> bool {
        self.i0 == particle || self.i1 == particle || self.i2 == particle
    }

    pub fn particles(&self) -> [usize; 3] {
        [self.i0, self.i1, self.i2]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    kind: TopologyKind,
    num_particles: usize,
    bonds: Vec<Bond>,
    angles: Vec<Angle>,
}

impl Topology {
    pub fn build(
        kind: TopologyKind,
        num_particles: usize,
        boundary: &Boundary,
    ) -> Result<Self, TopologyError> {
        match kind {
            TopologyKind::Chain => Self::chain(num_particles, false),
            TopologyKind::Ring => Self::chain(num_particles, true),
            TopologyKind::Mesh { side_x, side_y } => {
                if side_x * side_y != num_particles {
                    return Err(TopologyError::ParticleCountMismatch {
                        side_x,
                        side_y,
                        particles: num_particles,
                    });
                }
                Self::mesh(side_x, side_y, boundary)
            }
        }
    }

    pub fn chain(num_particles: usize, is_ring: bool) -> Result<Self, TopologyError> {
        let (kind, min) = if is_ring {
            (TopologyKind::Ring, 3)
        } else {
            (TopologyKind::Chain, 2)
        };
        if num_particles < min {
            return Err(TopologyError::TooFewParticles {
                kind: if is_ring { "ring" } else { "chain" },
                min,
                actual: num_particles,
            });
        }

        let n = num_particles;
        let mut bonds: Vec<Bond> = (0..n - 1).map(|i| Bond::new(i, i + 1)).collect();
        let mut angles: Vec<Angle> = (0..n.saturating_sub(2))
            .map(|i| Angle::new(i, i + 1, i + 2))
            .collect();
        if is_ring {
            bonds.push(Bond::new(n - 1, 0));
            angles.push(Angle::new(n - 2, n - 1, 0));
            angles.push(Angle::new(n - 1, 0, 1));
        }

        Ok(Self {
            kind,
            num_particles: n,
            bonds,
            angles,
        })
    }

    /// Toroidal square lattice: one bond and one colinear angle per site along
    /// each of `+x` and `+y`.
    pub fn mesh(side_x: usize, side_y: usize, boundary: &Boundary) -> Result<Self, TopologyError> {
        if !boundary.is_periodic() {
            return Err(TopologyError::MeshRequiresPeriodic);
        }
        if side_x < 3 || side_y < 3 {
            return Err(TopologyError::LatticeTooSmall { side_x, side_y });
        }

        let n = side_x * side_y;
        let site = |x: usize, y: usize| mesh_site_id(x, y, side_x, side_y);

        let mut bonds = Vec::with_capacity(2 * n);
        for y in 0..side_y {
            for x in 0..side_x {
                bonds.push(Bond::new(site(x, y), site(x + 1, y)));
            }
        }
        for y in 0..side_y {
            for x in 0..side_x {
                bonds.push(Bond::new(site(x, y), site(x, y + 1)));
            }
        }

        let mut angles = Vec::with_capacity(2 * n);
        for y in 0..side_y {
            for x in 0..side_x {
                angles.push(Angle::new(site(x, y), site(x + 1, y), site(x + 2, y)));
            }
        }
        for y in 0..side_y {
            for x in 0..side_x {
                angles.push(Angle::new(site(x, y), site(x, y + 1), site(x, y + 2)));
            }
        }

        Ok(Self {
            kind: TopologyKind::Mesh { side_x, side_y },
            num_particles: n,
            bonds,
            angles,
        })
    }

    #[inline]
    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    #[inline]
    pub fn num_particles(&self) -> usize {
        self.num_particles
    }

    #[inline]
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    #[inline]
    pub fn angles(&self) -> &[Angle] {
        &self.angles
    }
}

/// Lattice coordinates are reduced modulo the side lengths before indexing.
#[inline]
pub fn mesh_site_id(x: usize, y: usize, side_x: usize, side_y: usize) -> usize {
    x % side_x + (y % side_y) * side_x
}
