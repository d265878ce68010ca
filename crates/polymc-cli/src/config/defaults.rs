use polymc::core::geometry::boundary::BoundaryKind;
use polymc::core::models::configuration::{Dimensionality, InitialLayout};
use polymc::core::random::mt19937::DEFAULT_SEED;
use std::path::PathBuf;

/// Values used for parameters that neither the file nor the command line set.
pub struct DefaultsConfig {
    pub layout: InitialLayout,
    pub boundary: BoundaryKind,
    pub k_angle: f64,
    pub dimensionality: Dimensionality,
    pub seed: u32,
    pub micro_interval: u64,
    pub macro_interval: u64,
    pub output_directory: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            layout: InitialLayout::StraightChain,
            boundary: BoundaryKind::Free,
            k_angle: 0.0,
            dimensionality: Dimensionality::Planar,
            seed: DEFAULT_SEED,
            micro_interval: 100,
            macro_interval: 10,
            output_directory: PathBuf::from("polymc-output"),
        }
    }
}
