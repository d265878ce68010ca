use crate::cli::CheckArgs;
use crate::config::PartialSimulationConfig;
use crate::error::Result;
use polymc::core::forcefield::scoring::Scorer;
use polymc::engine::config::SimulationConfig;
use polymc::workflows::simulate::{self, PreparedRun};
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let partial_config = PartialSimulationConfig::from_file(&args.overrides.config)?;
    let config = partial_config.merge_with_cli(&args.overrides)?;
    info!("Configuration resolved; building the initial state.");

    let prepared = simulate::prepare(&config)?;
    println!("{}", describe(&config, &prepared));
    Ok(())
}

fn describe(config: &SimulationConfig, prepared: &PreparedRun) -> String {
    let state = &prepared.state;
    let topology = state.topology();
    let energy = Scorer::new(&config.forcefield, state.boundary())
        .total_energy(state.positions(), topology);

    let mut lines = vec![
        format!("Topology:       {}", topology.kind()),
        format!("Particles:      {}", topology.num_particles()),
        format!("Bonds:          {}", topology.bonds().len()),
        format!("Angles:         {}", topology.angles().len()),
        format!("Layout:         {}", config.system.layout.name()),
    ];
    let boundary = state.boundary();
    if boundary.is_periodic() {
        let l = boundary.box_length();
        lines.push(format!("Boundary:       periodic ({} x {} x {})", l.x, l.y, l.z));
    } else {
        lines.push("Boundary:       free".to_string());
    }
    lines.push(format!(
        "Initial energy: {:.6} (bond {:.6}, angle {:.6})",
        energy.total(),
        energy.bond,
        energy.angle
    ));
    if let Some((i, j)) = prepared.overlap {
        lines.push(format!("Warning:        particles {} and {} overlap", i, j));
    }
    lines.join("\n")
}
