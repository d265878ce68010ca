use crate::cli::RunArgs;
use crate::config::PartialSimulationConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use polymc::engine::progress::ProgressReporter;
use polymc::workflows::simulate::{self, RunSummary};
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let partial_config = PartialSimulationConfig::from_file(&args.overrides.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args.overrides)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting Monte Carlo run: {} particles, {} sweeps, seed {}.",
        config.system.num_particles, config.sampling.total_sweeps, config.sampling.seed
    );
    info!("Invoking the core simulation workflow...");
    let summary = simulate::run(&config, &reporter)?;

    println!("{}", format_summary(&summary));
    println!("Output written to: {}", config.output.directory.display());
    Ok(())
}

fn format_summary(summary: &RunSummary) -> String {
    let mut lines = vec![format!("✓ Completed {} sweeps.", summary.sweeps)];
    if let Some(ratio) = summary.mean_acceptance {
        lines.push(format!("  Mean acceptance ratio: {:.4}", ratio));
    }
    lines.push(format!(
        "  Final energy: {:.6} (bond {:.6}, angle {:.6})",
        summary.final_energy.total(),
        summary.final_energy.bond,
        summary.final_energy.angle
    ));
    if let Some(rg) = summary.means.radius_of_gyration {
        lines.push(format!("  Mean radius of gyration: {:.6}", rg));
    }
    if let Some(e2e) = summary.means.end_to_end {
        lines.push(format!("  Mean end-to-end distance: {:.6}", e2e));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn run_command_writes_the_output_directory() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("run.toml");
        fs::write(
            &config_path,
            r#"
            [system]
            layout = "ring"
            num-particles = 10

            [forcefield]
            bond-potential = "finite-rest-length"
            bond-length = 1.0
            k-bond = 10.0
            k-angle = 2.0

            [sampling]
            step-length = 0.1
            total-sweeps = 6

            [observation]
            micro-interval = 3
            macro-interval = 2
            "#,
        )
        .unwrap();
        let output = dir.path().join("out");

        let cli = Cli::parse_from([
            "polymc",
            "run",
            "-c",
            config_path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--write-final-config",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("Expected 'run' subcommand");
        };
        run(args).unwrap();

        for name in [
            "energy.dat",
            "pressure.dat",
            "traject.xyz",
            "topology.dat",
            "resolved_config.toml",
            "fin_config.bin",
            "summary.toml",
        ] {
            assert!(output.join(name).exists(), "missing {name}");
        }
    }

    #[test]
    fn summary_lists_acceptance_and_energy() {
        let summary = RunSummary {
            sweeps: 3,
            mean_acceptance: Some(0.5),
            final_energy: polymc::core::forcefield::term::EnergyTerm::new(1.0, 0.5),
            means: Default::default(),
        };
        let text = format_summary(&summary);
        assert!(text.contains("Completed 3 sweeps"));
        assert!(text.contains("Mean acceptance ratio: 0.5000"));
        assert!(text.contains("Final energy: 1.500000"));
        assert!(!text.contains("radius of gyration"));
    }
}
