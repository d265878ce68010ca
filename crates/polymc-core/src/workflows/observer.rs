use crate::core::analysis::observables::{
    RunningMean, TensorMean, bond_lengths, end_to_end_distance, radius_of_gyration,
};
use crate::core::analysis::spectrum::FluctuationSpectrum;
use crate::core::forcefield::params::ForcefieldParams;
use crate::core::forcefield::scoring::Scorer;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::io::xyz;
use crate::core::models::system::SimulationState;
use crate::engine::config::ObservationConfig;
use nalgebra::Matrix3;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const TRAJECTORY_FILE: &str = "traject.xyz";
pub const BOND_LENGTH_FILE: &str = "bondlen_dist.dat";
pub const ENERGY_FILE: &str = "energy.dat";
pub const PRESSURE_FILE: &str = "pressure.dat";
pub const RG_FILE: &str = "rg.dat";
pub const END_TO_END_FILE: &str = "end2end.dat";
pub const ACCEPT_RATIO_FILE: &str = "accept_ratio.dat";
pub const SPECTRUM_FILE: &str = "fluct_spectrum.dat";
pub const SUMMARY_FILE: &str = "summary.toml";

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize observation summary: {0}")]
    Summary(#[from] toml::ser::Error),
}

struct Sink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Sink {
    fn create(dir: &Path, name: &str, header: Option<&str>) -> Result<Self, ObserverError> {
        let path = dir.join(name);
        let file = File::create(&path).map_err(|source| ObserverError::Io {
            path: path.clone(),
            source,
        })?;
        let mut sink = Self {
            path,
            writer: BufWriter::new(file),
        };
        if let Some(header) = header {
            sink.line(format_args!("{header}"))?;
        }
        Ok(sink)
    }

    fn io_error(&self, source: std::io::Error) -> ObserverError {
        ObserverError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) -> Result<(), ObserverError> {
        self.writer
            .write_fmt(args)
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|e| self.io_error(e))
    }

    fn finish(mut self) -> Result<(), ObserverError> {
        self.writer.flush().map_err(|e| self.io_error(e))
    }
}

fn virial_row(v: &Matrix3<f64>) -> String {
    let mut row = String::new();
    for i in 0..3 {
        for j in 0..3 {
            if !row.is_empty() {
                row.push(' ');
            }
            row.push_str(&v[(i, j)].to_string());
        }
    }
    row
}

/// Time averages over all macro observations of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObservableMeans {
    pub macro_frames: u64,
    pub micro_frames: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bond_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_of_gyration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_to_end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virial: Option<[[f64; 3]; 3]>,
}

/// Writes observables of a running simulation into an output directory.
///
/// Micro observations (trajectory frame, bond lengths) and macro observations
/// (energies, virial, shape measures, acceptance ratio, spectrum sample) are
/// taken after sweeps whose index is a multiple of the respective interval.
pub struct Observer {
    forcefield: ForcefieldParams,
    micro_interval: u64,
    macro_interval: u64,
    output_dir: PathBuf,

    trajectory: Sink,
    bond_lengths: Sink,
    energy: Sink,
    pressure: Sink,
    rg: Sink,
    end_to_end: Sink,
    accept_ratio: Sink,
    spectrum: Option<FluctuationSpectrum>,

    micro_frames: u64,
    bond_mean: RunningMean,
    angle_mean: RunningMean,
    rg_mean: RunningMean,
    end_to_end_mean: RunningMean,
    accept_mean: RunningMean,
    virial_mean: TensorMean,
}

impl Observer {
    pub fn create(
        output_dir: &Path,
        observation: &ObservationConfig,
        forcefield: ForcefieldParams,
        state: &SimulationState,
    ) -> Result<Self, ObserverError> {
        let spectrum = FluctuationSpectrum::new(
            state.topology().kind(),
            state.boundary(),
            forcefield.bond_length,
        );
        debug!(
            "Creating observer in {:?} (micro every {}, macro every {}, spectrum: {}).",
            output_dir,
            observation.micro_interval,
            observation.macro_interval,
            spectrum.is_some()
        );

        Ok(Self {
            forcefield,
            micro_interval: observation.micro_interval,
            macro_interval: observation.macro_interval,
            output_dir: output_dir.to_path_buf(),
            trajectory: Sink::create(output_dir, TRAJECTORY_FILE, None)?,
            bond_lengths: Sink::create(output_dir, BOND_LENGTH_FILE, Some("# bond length"))?,
            energy: Sink::create(output_dir, ENERGY_FILE, Some("# mcsteps bond angle total"))?,
            pressure: Sink::create(
                output_dir,
                PRESSURE_FILE,
                Some("# mcsteps xx xy xz yx yy yz zx zy zz"),
            )?,
            rg: Sink::create(output_dir, RG_FILE, Some("# mcsteps rg"))?,
            end_to_end: Sink::create(output_dir, END_TO_END_FILE, Some("# mcsteps end2end"))?,
            accept_ratio: Sink::create(
                output_dir,
                ACCEPT_RATIO_FILE,
                Some("# mcsteps accept_ratio"),
            )?,
            spectrum,
            micro_frames: 0,
            bond_mean: RunningMean::default(),
            angle_mean: RunningMean::default(),
            rg_mean: RunningMean::default(),
            end_to_end_mean: RunningMean::default(),
            accept_mean: RunningMean::default(),
            virial_mean: TensorMean::default(),
        })
    }

    #[inline]
    pub fn is_micro_step(&self, sweep: u64) -> bool {
        sweep % self.micro_interval == 0
    }

    #[inline]
    pub fn is_macro_step(&self, sweep: u64) -> bool {
        sweep % self.macro_interval == 0
    }

    pub fn observe(&mut self, sweep: u64, state: &SimulationState) -> Result<(), ObserverError> {
        if self.is_micro_step(sweep) {
            self.observe_micro(sweep, state)?;
        }
        if self.is_macro_step(sweep) {
            self.observe_macro(sweep, state)?;
        }
        Ok(())
    }

    fn observe_micro(&mut self, sweep: u64, state: &SimulationState) -> Result<(), ObserverError> {
        xyz::write_frame(&mut self.trajectory.writer, sweep, state.positions())
            .map_err(|e| self.trajectory.io_error(e))?;
        for length in bond_lengths(state.positions(), state.topology(), state.boundary()) {
            self.bond_lengths.line(format_args!("{length}"))?;
        }
        self.micro_frames += 1;
        Ok(())
    }

    fn observe_macro(&mut self, sweep: u64, state: &SimulationState) -> Result<(), ObserverError> {
        let scorer = Scorer::new(&self.forcefield, state.boundary());
        let positions = state.positions();

        let energy: EnergyTerm = scorer.total_energy(positions, state.topology());
        self.energy.line(format_args!(
            "{} {} {} {}",
            sweep,
            energy.bond,
            energy.angle,
            energy.total()
        ))?;
        self.bond_mean.push(energy.bond);
        self.angle_mean.push(energy.angle);

        let virial = scorer.total_virial(positions, state.topology());
        self.pressure
            .line(format_args!("{} {}", sweep, virial_row(&virial)))?;
        self.virial_mean.push(&virial);

        let rg = radius_of_gyration(positions, state.boundary());
        self.rg.line(format_args!("{sweep} {rg}"))?;
        self.rg_mean.push(rg);

        let e2e = end_to_end_distance(positions, state.boundary());
        self.end_to_end.line(format_args!("{sweep} {e2e}"))?;
        self.end_to_end_mean.push(e2e);

        let ratio = state.acceptance_ratio();
        self.accept_ratio.line(format_args!("{sweep} {ratio}"))?;
        self.accept_mean.push(ratio);

        if let Some(spectrum) = self.spectrum.as_mut() {
            spectrum.accumulate(positions);
        }
        Ok(())
    }

    /// Appends mean lines, writes the spectrum and `summary.toml`, and flushes
    /// every file.
    pub fn finish(mut self) -> Result<ObservableMeans, ObserverError> {
        let bond = self.bond_mean.mean();
        let angle = self.angle_mean.mean();
        let total = bond.zip(angle).map(|(b, a)| b + a);
        if let (Some(b), Some(a), Some(t)) = (bond, angle, total) {
            self.energy.line(format_args!("# mean = {b} {a} {t}"))?;
        }
        let virial = self.virial_mean.mean();
        if let Some(v) = &virial {
            self.pressure
                .line(format_args!("# mean = {}", virial_row(v)))?;
        }

        if let Some(spectrum) = &self.spectrum {
            let mut sink = Sink::create(&self.output_dir, SPECTRUM_FILE, Some("# |q| S(q)"))?;
            for (q, s) in spectrum.spectrum() {
                sink.line(format_args!("{q} {s}"))?;
            }
            sink.finish()?;
        }

        let means = ObservableMeans {
            macro_frames: self.bond_mean.count(),
            micro_frames: self.micro_frames,
            bond_energy: bond,
            angle_energy: angle,
            total_energy: total,
            radius_of_gyration: self.rg_mean.mean(),
            end_to_end: self.end_to_end_mean.mean(),
            acceptance_ratio: self.accept_mean.mean(),
            virial: virial.map(|v| {
                let mut rows = [[0.0; 3]; 3];
                for (i, row) in rows.iter_mut().enumerate() {
                    for (j, value) in row.iter_mut().enumerate() {
                        *value = v[(i, j)];
                    }
                }
                rows
            }),
        };
        let summary_path = self.output_dir.join(SUMMARY_FILE);
        std::fs::write(&summary_path, toml::to_string(&means)?).map_err(|source| {
            ObserverError::Io {
                path: summary_path.clone(),
                source,
            }
        })?;

        for sink in [
            self.trajectory,
            self.bond_lengths,
            self.energy,
            self.pressure,
            self.rg,
            self.end_to_end,
            self.accept_ratio,
        ] {
            sink.finish()?;
        }
        Ok(means)
    }
}
