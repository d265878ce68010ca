mod defaults;

use crate::cli::ConfigOverrides;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use nalgebra::Vector3;
use polymc::core::forcefield::params::{BondPotential, ForcefieldParams};
use polymc::core::geometry::boundary::BoundaryKind;
use polymc::core::models::configuration::{Dimensionality, InitialLayout};
use polymc::core::models::topology::TopologyKind;
use polymc::engine::config::{SimulationConfig, SimulationConfigBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Connectivity as written in the parameter file; mesh sides live next to it.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PartialTopology {
    Chain,
    Ring,
    Mesh,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSystemConfig {
    layout: Option<InitialLayout>,
    topology: Option<PartialTopology>,
    num_particles: Option<usize>,
    side_x: Option<usize>,
    side_y: Option<usize>,
    boundary: Option<BoundaryKind>,
    box_length: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialForcefieldConfig {
    bond_potential: Option<BondPotential>,
    bond_length: Option<f64>,
    initial_bond_length: Option<f64>,
    k_bond: Option<f64>,
    k_angle: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSamplingConfig {
    step_length: Option<f64>,
    dimensionality: Option<Dimensionality>,
    total_sweeps: Option<u64>,
    seed: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialObservationConfig {
    micro_interval: Option<u64>,
    macro_interval: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSimulationConfig {
    system: Option<PartialSystemConfig>,
    forcefield: Option<PartialForcefieldConfig>,
    sampling: Option<PartialSamplingConfig>,
    observation: Option<PartialObservationConfig>,
}

#[derive(Deserialize)]
struct Holder<T> {
    value: T,
}

/// Parses a `--set` value as a TOML value, retrying as a bare string so that
/// `boundary=periodic` works without quotes.
fn parse_set_value<T: DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    toml::from_str::<Holder<T>>(&format!("value = {value}"))
        .or_else(|_| toml::from_str::<Holder<T>>(&format!("value = {value:?}")))
        .map(|holder| holder.value)
        .map_err(|_| CliError::Config(format!("Invalid value for {key}: {value}")))
}

impl PartialSimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn merge_with_cli(mut self, args: &ConfigOverrides) -> Result<SimulationConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let system = self.system.take().unwrap_or_default();
        let mut ff = self.forcefield.take().unwrap_or_default();
        if let Some(path) = &args.forcefield {
            debug!("Loading forcefield parameters from {:?}", path);
            let params = ForcefieldParams::load(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?;
            ff.bond_potential = Some(params.bond_potential);
            ff.bond_length = Some(params.bond_length);
            ff.k_bond = Some(params.k_bond);
            ff.k_angle = Some(params.k_angle);
        }
        let sampling = self.sampling.take().unwrap_or_default();
        let observation = self.observation.take().unwrap_or_default();

        let mut builder = SimulationConfigBuilder::new()
            .layout(system.layout.unwrap_or(defaults.layout))
            .boundary(system.boundary.unwrap_or(defaults.boundary))
            .k_angle(ff.k_angle.unwrap_or(defaults.k_angle))
            .dimensionality(sampling.dimensionality.unwrap_or(defaults.dimensionality))
            .seed(args.seed.or(sampling.seed).unwrap_or(defaults.seed))
            .micro_interval(
                observation
                    .micro_interval
                    .unwrap_or(defaults.micro_interval),
            )
            .macro_interval(
                observation
                    .macro_interval
                    .unwrap_or(defaults.macro_interval),
            )
            .output_directory(
                args.output
                    .clone()
                    .unwrap_or(defaults.output_directory),
            )
            .restart_from(args.restart.clone())
            .write_final_config(args.write_final_config);

        let mesh_sides = match (system.side_x, system.side_y) {
            (Some(side_x), Some(side_y)) => Some((side_x, side_y)),
            (None, None) => None,
            _ => {
                return Err(CliError::Config(
                    "`system.side-x` and `system.side-y` must be given together.".to_string(),
                ));
            }
        };
        if let Some((side_x, side_y)) = mesh_sides {
            builder = builder.mesh_sides(side_x, side_y);
        }
        if let Some(topology) = system.topology {
            builder = builder.topology(Self::resolve_topology(topology, mesh_sides)?);
        }
        if let Some(n) = system.num_particles {
            builder = builder.num_particles(n);
        }
        if let Some([x, y, z]) = system.box_length {
            builder = builder.box_length(Vector3::new(x, y, z));
        }

        if let Some(potential) = ff.bond_potential {
            builder = builder.bond_potential(potential);
        }
        if let Some(length) = ff.bond_length {
            builder = builder.bond_length(length);
        }
        if let Some(length) = ff.initial_bond_length {
            builder = builder.initial_bond_length(length);
        }
        if let Some(k) = ff.k_bond {
            builder = builder.k_bond(k);
        }

        if let Some(step) = args.step_length.or(sampling.step_length) {
            builder = builder.step_length(step);
        }
        if let Some(sweeps) = args.sweeps.or(sampling.total_sweeps) {
            builder = builder.total_sweeps(sweeps);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn resolve_topology(
        topology: PartialTopology,
        mesh_sides: Option<(usize, usize)>,
    ) -> Result<TopologyKind> {
        match topology {
            PartialTopology::Chain => Ok(TopologyKind::Chain),
            PartialTopology::Ring => Ok(TopologyKind::Ring),
            PartialTopology::Mesh => mesh_sides
                .map(|(side_x, side_y)| TopologyKind::Mesh { side_x, side_y })
                .ok_or_else(|| {
                    CliError::Config(
                        "A mesh topology requires `system.side-x` and `system.side-y`."
                            .to_string(),
                    )
                }),
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "system.layout" => self.system_mut().layout = Some(parse_set_value(key, value)?),
                "system.topology" => {
                    self.system_mut().topology = Some(parse_set_value(key, value)?)
                }
                "system.num-particles" => {
                    self.system_mut().num_particles = Some(parse_set_value(key, value)?)
                }
                "system.side-x" => self.system_mut().side_x = Some(parse_set_value(key, value)?),
                "system.side-y" => self.system_mut().side_y = Some(parse_set_value(key, value)?),
                "system.boundary" => {
                    self.system_mut().boundary = Some(parse_set_value(key, value)?)
                }
                "system.box-length" => {
                    self.system_mut().box_length = Some(parse_set_value(key, value)?)
                }
                "forcefield.bond-potential" => {
                    self.forcefield_mut().bond_potential = Some(parse_set_value(key, value)?)
                }
                "forcefield.bond-length" => {
                    self.forcefield_mut().bond_length = Some(parse_set_value(key, value)?)
                }
                "forcefield.initial-bond-length" => {
                    self.forcefield_mut().initial_bond_length = Some(parse_set_value(key, value)?)
                }
                "forcefield.k-bond" => {
                    self.forcefield_mut().k_bond = Some(parse_set_value(key, value)?)
                }
                "forcefield.k-angle" => {
                    self.forcefield_mut().k_angle = Some(parse_set_value(key, value)?)
                }
                "sampling.step-length" => {
                    self.sampling_mut().step_length = Some(parse_set_value(key, value)?)
                }
                "sampling.dimensionality" => {
                    self.sampling_mut().dimensionality = Some(parse_set_value(key, value)?)
                }
                "sampling.total-sweeps" => {
                    self.sampling_mut().total_sweeps = Some(parse_set_value(key, value)?)
                }
                "sampling.seed" => self.sampling_mut().seed = Some(parse_set_value(key, value)?),
                "observation.micro-interval" => {
                    self.observation_mut().micro_interval = Some(parse_set_value(key, value)?)
                }
                "observation.macro-interval" => {
                    self.observation_mut().macro_interval = Some(parse_set_value(key, value)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unknown configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn system_mut(&mut self) -> &mut PartialSystemConfig {
        self.system.get_or_insert_with(Default::default)
    }

    fn forcefield_mut(&mut self) -> &mut PartialForcefieldConfig {
        self.forcefield.get_or_insert_with(Default::default)
    }

    fn sampling_mut(&mut self) -> &mut PartialSamplingConfig {
        self.sampling.get_or_insert_with(Default::default)
    }

    fn observation_mut(&mut self) -> &mut PartialObservationConfig {
        self.observation.get_or_insert_with(Default::default)
    }
}
