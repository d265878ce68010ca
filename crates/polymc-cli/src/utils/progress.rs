use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use polymc::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Sweep bar plus the running acceptance statistics shown next to it.
struct SweepDisplay {
    bar: ProgressBar,
    acceptance_sum: f64,
    sweeps_seen: u64,
}

impl SweepDisplay {
    fn mean_acceptance(&self) -> Option<f64> {
        (self.sweeps_seen > 0).then(|| self.acceptance_sum / self.sweeps_seen as f64)
    }

    fn handle(&mut self, event: Progress) {
        match event {
            Progress::Stage { name } => {
                self.bar.reset();
                self.bar.set_length(0);
                self.bar.set_style(stage_style());
                self.bar.set_message(name);
                self.bar
                    .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::SamplingStart { total_sweeps } => {
                self.acceptance_sum = 0.0;
                self.sweeps_seen = 0;
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_style(sweep_style());
                self.bar.set_length(total_sweeps);
                self.bar.set_message("acc -");
            }
            Progress::SweepFinished {
                sweep,
                acceptance_ratio,
            } => {
                self.acceptance_sum += acceptance_ratio;
                self.sweeps_seen += 1;
                self.bar.set_position(sweep + 1);
                if let Some(mean) = self.mean_acceptance() {
                    self.bar
                        .set_message(format!("acc {:.3} (mean {:.3})", acceptance_ratio, mean));
                }
            }
            Progress::SamplingFinish { sweeps } => {
                self.bar.set_position(sweeps);
                let summary = match self.mean_acceptance() {
                    Some(mean) => format!("{} sweeps, mean acc {:.3}", sweeps, mean),
                    None => format!("{} sweeps", sweeps),
                };
                self.bar.finish_with_message(summary);
            }
            Progress::Finished => {
                self.bar.disable_steady_tick();
                self.bar.finish_and_clear();
            }
        }
    }
}

fn stage_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .expect("Failed to create stage style template")
}

fn sweep_style() -> ProgressStyle {
    ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} sweeps {msg} ({eta})")
        .expect("Failed to create sweep style template")
        .progress_chars("##-")
}

/// Renders simulation progress on stderr with `indicatif`.
#[derive(Clone)]
pub struct CliProgressHandler {
    display: Arc<Mutex<SweepDisplay>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        Self {
            display: Arc::new(Mutex::new(SweepDisplay {
                bar,
                acceptance_sum: 0.0,
                sweeps_seen: 0,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let display = self.display.clone();
        Box::new(move |event: Progress| match display.lock() {
            Ok(mut display) => display.handle(event),
            Err(_) => warn!("Progress display mutex was poisoned. Cannot update progress."),
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
