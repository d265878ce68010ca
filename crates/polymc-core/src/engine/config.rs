use crate::core::forcefield::params::{BondPotential, ForcefieldParams};
use crate::core::geometry::boundary::BoundaryKind;
use crate::core::models::configuration::{Dimensionality, InitialLayout};
use crate::core::models::topology::TopologyKind;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SystemConfig {
    pub num_particles: usize,
    pub layout: InitialLayout,
    pub boundary: BoundaryKind,
    pub box_length: Vector3<f64>,
    pub topology: TopologyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SamplingConfig {
    pub step_length: f64,
    pub dimensionality: Dimensionality,
    pub total_sweeps: u64,
    pub seed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObservationConfig {
    pub micro_interval: u64,
    pub macro_interval: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    pub directory: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_from: Option<PathBuf>,
    pub write_final_config: bool,
    pub write_topology: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulationConfig {
    /// Bond length used to build the starting configuration.
    pub initial_bond_length: f64,
    pub system: SystemConfig,
    pub forcefield: ForcefieldParams,
    pub sampling: SamplingConfig,
    pub observation: ObservationConfig,
    pub output: OutputConfig,
}

/// Picks the connectivity implied by a starting layout.
///
/// Chain-like layouts close into a ring under a periodic boundary, matching the
/// behaviour of periodic polymer runs where both ends are bonded across the box.
pub fn topology_for_layout(
    layout: InitialLayout,
    boundary: BoundaryKind,
    mesh_sides: Option<(usize, usize)>,
) -> Option<TopologyKind> {
    match layout {
        InitialLayout::StraightChain | InitialLayout::RandomWalk => Some(match boundary {
            BoundaryKind::Free => TopologyKind::Chain,
            BoundaryKind::Periodic => TopologyKind::Ring,
        }),
        InitialLayout::Ring => Some(TopologyKind::Ring),
        InitialLayout::FlatMesh => {
            mesh_sides.map(|(side_x, side_y)| TopologyKind::Mesh { side_x, side_y })
        }
    }
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    num_particles: Option<usize>,
    mesh_sides: Option<(usize, usize)>,
    layout: Option<InitialLayout>,
    topology: Option<TopologyKind>,
    boundary: Option<BoundaryKind>,
    box_length: Option<Vector3<f64>>,
    bond_potential: Option<BondPotential>,
    bond_length: Option<f64>,
    initial_bond_length: Option<f64>,
    k_bond: Option<f64>,
    k_angle: Option<f64>,
    step_length: Option<f64>,
    dimensionality: Option<Dimensionality>,
    total_sweeps: Option<u64>,
    seed: Option<u32>,
    micro_interval: Option<u64>,
    macro_interval: Option<u64>,
    output_directory: Option<PathBuf>,
    restart_from: Option<PathBuf>,
    write_final_config: Option<bool>,
    write_topology: Option<bool>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_particles(mut self, n: usize) -> Self {
        self.num_particles = Some(n);
        self
    }
    pub fn mesh_sides(mut self, side_x: usize, side_y: usize) -> Self {
        self.mesh_sides = Some((side_x, side_y));
        self
    }
    pub fn layout(mut self, layout: InitialLayout) -> Self {
        self.layout = Some(layout);
        self
    }
    pub fn topology(mut self, kind: TopologyKind) -> Self {
        self.topology = Some(kind);
        self
    }
    pub fn boundary(mut self, kind: BoundaryKind) -> Self {
        self.boundary = Some(kind);
        self
    }
    pub fn box_length(mut self, length: Vector3<f64>) -> Self {
        self.box_length = Some(length);
        self
    }
    pub fn bond_potential(mut self, potential: BondPotential) -> Self {
        self.bond_potential = Some(potential);
        self
    }
    pub fn bond_length(mut self, length: f64) -> Self {
        self.bond_length = Some(length);
        self
    }
    pub fn initial_bond_length(mut self, length: f64) -> Self {
        self.initial_bond_length = Some(length);
        self
    }
    pub fn k_bond(mut self, k: f64) -> Self {
        self.k_bond = Some(k);
        self
    }
    pub fn k_angle(mut self, k: f64) -> Self {
        self.k_angle = Some(k);
        self
    }
    pub fn step_length(mut self, length: f64) -> Self {
        self.step_length = Some(length);
        self
    }
    pub fn dimensionality(mut self, dims: Dimensionality) -> Self {
        self.dimensionality = Some(dims);
        self
    }
    pub fn total_sweeps(mut self, sweeps: u64) -> Self {
        self.total_sweeps = Some(sweeps);
        self
    }
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn micro_interval(mut self, interval: u64) -> Self {
        self.micro_interval = Some(interval);
        self
    }
    pub fn macro_interval(mut self, interval: u64) -> Self {
        self.macro_interval = Some(interval);
        self
    }
    pub fn output_directory(mut self, dir: PathBuf) -> Self {
        self.output_directory = Some(dir);
        self
    }
    pub fn restart_from(mut self, path: Option<PathBuf>) -> Self {
        self.restart_from = path;
        self
    }
    pub fn write_final_config(mut self, enabled: bool) -> Self {
        self.write_final_config = Some(enabled);
        self
    }
    pub fn write_topology(mut self, enabled: bool) -> Self {
        self.write_topology = Some(enabled);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let layout = self.layout.ok_or(ConfigError::MissingParameter("layout"))?;
        let boundary = self
            .boundary
            .ok_or(ConfigError::MissingParameter("boundary"))?;
        let topology = match self.topology {
            Some(TopologyKind::Chain) if boundary == BoundaryKind::Periodic => TopologyKind::Ring,
            Some(kind) => kind,
            None => topology_for_layout(layout, boundary, self.mesh_sides)
                .ok_or(ConfigError::MissingParameter("mesh_sides"))?,
        };

        let num_particles = match (topology, self.num_particles) {
            (TopologyKind::Mesh { side_x, side_y }, None) => side_x * side_y,
            (_, Some(n)) => n,
            (_, None) => return Err(ConfigError::MissingParameter("num_particles")),
        };
        if num_particles > i32::MAX as usize {
            return Err(invalid("num_particles", "exceeds the restart format limit"));
        }
        if boundary == BoundaryKind::Periodic && num_particles < 3 {
            return Err(invalid(
                "num_particles",
                "periodic runs move particles 1..=N-2 and need at least 3 particles",
            ));
        }

        let box_length = match boundary {
            BoundaryKind::Free => self.box_length.unwrap_or_else(Vector3::zeros),
            BoundaryKind::Periodic => self
                .box_length
                .ok_or(ConfigError::MissingParameter("box_length"))?,
        };

        let forcefield = ForcefieldParams {
            bond_potential: self
                .bond_potential
                .ok_or(ConfigError::MissingParameter("bond_potential"))?,
            bond_length: self
                .bond_length
                .ok_or(ConfigError::MissingParameter("bond_length"))?,
            k_bond: self.k_bond.ok_or(ConfigError::MissingParameter("k_bond"))?,
            k_angle: self
                .k_angle
                .ok_or(ConfigError::MissingParameter("k_angle"))?,
        };
        forcefield
            .validate()
            .map_err(|e| invalid("forcefield", e.to_string()))?;
        let initial_bond_length = self.initial_bond_length.unwrap_or(forcefield.bond_length);
        if !initial_bond_length.is_finite() || initial_bond_length < 0.0 {
            return Err(invalid(
                "initial_bond_length",
                format!("{initial_bond_length} is not a finite non-negative length"),
            ));
        }

        let step_length = self
            .step_length
            .ok_or(ConfigError::MissingParameter("step_length"))?;
        if !step_length.is_finite() || step_length < 0.0 {
            return Err(invalid(
                "step_length",
                format!("{step_length} is not a finite non-negative length"),
            ));
        }

        let micro_interval = self
            .micro_interval
            .ok_or(ConfigError::MissingParameter("micro_interval"))?;
        let macro_interval = self
            .macro_interval
            .ok_or(ConfigError::MissingParameter("macro_interval"))?;
        if micro_interval == 0 || macro_interval == 0 {
            return Err(invalid("observation interval", "must be at least 1"));
        }

        Ok(SimulationConfig {
            initial_bond_length,
            system: SystemConfig {
                num_particles,
                layout,
                boundary,
                box_length,
                topology,
            },
            forcefield,
            sampling: SamplingConfig {
                step_length,
                dimensionality: self.dimensionality.unwrap_or_default(),
                total_sweeps: self
                    .total_sweeps
                    .ok_or(ConfigError::MissingParameter("total_sweeps"))?,
                seed: self.seed.ok_or(ConfigError::MissingParameter("seed"))?,
            },
            observation: ObservationConfig {
                micro_interval,
                macro_interval,
            },
            output: OutputConfig {
                directory: self
                    .output_directory
                    .ok_or(ConfigError::MissingParameter("output_directory"))?,
                restart_from: self.restart_from,
                write_final_config: self.write_final_config.unwrap_or(false),
                write_topology: self.write_topology.unwrap_or(true),
            },
        })
    }
}
