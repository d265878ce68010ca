use super::observer::{ObservableMeans, Observer};
use crate::core::analysis::observables::RunningMean;
use crate::core::forcefield::scoring::Scorer;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::geometry::boundary::Boundary;
use crate::core::io::restart::{self, RestartFile};
use crate::core::io::topology_dump;
use crate::core::io::traits::ConfigurationFile;
use crate::core::models::system::SimulationState;
use crate::core::models::topology::Topology;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::evolver::Evolver;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Beads closer than this at start-up are reported as overlapping.
pub const OVERLAP_DISTANCE: f64 = 1.0;

pub const TOPOLOGY_FILE: &str = "topology.dat";
pub const RESOLVED_CONFIG_FILE: &str = "resolved_config.toml";
pub const FINAL_CONFIG_FILE: &str = "fin_config.bin";

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub sweeps: u64,
    /// Mean of the per-sweep acceptance ratios; `None` for a zero-sweep run.
    pub mean_acceptance: Option<f64>,
    pub final_energy: EnergyTerm,
    pub means: ObservableMeans,
}

/// The starting point of a run: the initial state and an engine whose random
/// stream has already supplied any random layout.
pub struct PreparedRun {
    pub state: SimulationState,
    pub evolver: Evolver,
    pub overlap: Option<(usize, usize)>,
}

/// Builds the boundary, topology, engine and initial configuration for
/// `config` without touching the output directory.
pub fn prepare(config: &SimulationConfig) -> Result<PreparedRun, EngineError> {
    let system = &config.system;
    let boundary = Boundary::from_kind(system.boundary, system.box_length)?;
    let topology = Topology::build(system.topology, system.num_particles, &boundary)?;
    info!(
        "Built {} topology: {} particles, {} bonds, {} angles.",
        topology.kind(),
        topology.num_particles(),
        topology.bonds().len(),
        topology.angles().len()
    );

    let mut evolver = Evolver::new(config);
    let positions = system.layout.generate(
        system.topology,
        system.num_particles,
        config.initial_bond_length,
        config.sampling.dimensionality,
        evolver.rng_mut(),
    )?;
    let mut state = SimulationState::new(positions, topology, boundary)?;

    if let Some(path) = &config.output.restart_from {
        restart::load_into(path, &mut state)?;
    }

    let overlap = state
        .boundary()
        .find_overlap(state.positions(), OVERLAP_DISTANCE);
    if let Some((i, j)) = overlap {
        warn!(
            "Initial configuration has overlapping beads: particles {} and {} are closer than {}.",
            i, j, OVERLAP_DISTANCE
        );
    }

    Ok(PreparedRun {
        state,
        evolver,
        overlap,
    })
}

fn output_error(path: &Path) -> impl FnOnce(std::io::Error) -> EngineError + '_ {
    move |source| EngineError::Output {
        path: path.to_path_buf(),
        source,
    }
}

fn write_run_header(
    config: &SimulationConfig,
    state: &SimulationState,
) -> Result<(), EngineError> {
    let dir = &config.output.directory;
    fs::create_dir_all(dir).map_err(output_error(dir))?;

    let resolved = toml::to_string_pretty(config)
        .map_err(|e| EngineError::Internal(format!("cannot serialize configuration: {e}")))?;
    let resolved_path = dir.join(RESOLVED_CONFIG_FILE);
    fs::write(&resolved_path, resolved).map_err(output_error(&resolved_path))?;

    if config.output.write_topology {
        let topology_path = dir.join(TOPOLOGY_FILE);
        let file = File::create(&topology_path).map_err(output_error(&topology_path))?;
        let mut writer = BufWriter::new(file);
        topology_dump::write_topology(&mut writer, state.topology())
            .and_then(|_| writer.flush())
            .map_err(output_error(&topology_path))?;
    }
    Ok(())
}

#[instrument(skip_all, name = "simulation_workflow")]
pub fn run(
    config: &SimulationConfig,
    reporter: &ProgressReporter,
) -> Result<RunSummary, EngineError> {
    // === Phase 0: Preparation ===
    reporter.report(Progress::Stage {
        name: "Preparation",
    });
    info!("Preparing simulation in {:?}.", config.output.directory);
    let PreparedRun {
        mut state,
        mut evolver,
        ..
    } = prepare(config)?;
    write_run_header(config, &state)?;
    let mut observer = Observer::create(
        &config.output.directory,
        &config.observation,
        config.forcefield,
        &state,
    )?;

    // === Phase 1: Sampling ===
    let total = config.sampling.total_sweeps;
    reporter.report(Progress::SamplingStart {
        total_sweeps: total,
    });
    info!(
        "Running {} sweeps of {} trial moves.",
        total,
        state.num_particles()
    );

    let mut acceptance = RunningMean::default();
    while !evolver.is_finished() {
        let outcome = evolver.sweep(&mut state)?;
        acceptance.push(outcome.acceptance_ratio);
        observer.observe(outcome.sweep, &state)?;
        reporter.report(Progress::SweepFinished {
            sweep: outcome.sweep,
            acceptance_ratio: outcome.acceptance_ratio,
        });
    }
    reporter.report(Progress::SamplingFinish {
        sweeps: evolver.sweeps_completed(),
    });

    // === Phase 2: Finalization ===
    reporter.report(Progress::Stage {
        name: "Finalization",
    });
    let means = observer.finish()?;
    if config.output.write_final_config {
        let path = config.output.directory.join(FINAL_CONFIG_FILE);
        RestartFile::write_to_path(state.positions(), &path)?;
        info!("Final configuration written to {:?}.", path);
    }
    let final_energy = Scorer::new(&config.forcefield, state.boundary())
        .total_energy(state.positions(), state.topology());

    reporter.report(Progress::Finished);

    let summary = RunSummary {
        sweeps: evolver.sweeps_completed(),
        mean_acceptance: acceptance.mean(),
        final_energy,
        means,
    };
    info!(
        "Simulation complete: {} sweeps, final energy {:.6}.",
        summary.sweeps,
        summary.final_energy.total()
    );
    Ok(summary)
}
