/// Events emitted by the simulation workflow while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A set-up or wrap-up stage without a sweep count has begun.
    Stage { name: &'static str },
    /// Sampling is about to run `total_sweeps` sweeps.
    SamplingStart { total_sweeps: u64 },
    /// Sweep `sweep` (zero-based) has completed.
    SweepFinished { sweep: u64, acceptance_ratio: f64 },
    /// Sampling ended after `sweeps` sweeps.
    SamplingFinish { sweeps: u64 },
    /// The run has written its final outputs.
    Finished,
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
