use super::config::ConfigError;
use crate::core::geometry::boundary::BoundaryError;
use crate::core::io::restart::RestartError;
use crate::core::models::configuration::LayoutError;
use crate::core::models::system::StateError;
use crate::core::models::topology::TopologyError;
use crate::workflows::observer::ObserverError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Boundary error: {0}")]
    Boundary(#[from] BoundaryError),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Initial configuration error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Simulation state error: {0}")]
    State(#[from] StateError),

    #[error("Restart file error: {0}")]
    Restart(#[from] RestartError),

    #[error("Non-finite energy after moving particle {particle} in sweep {sweep}")]
    NonFiniteEnergy { particle: usize, sweep: u64 },

    #[error("Sweep limit of {limit} reached; no further sweeps are allowed")]
    SweepLimitReached { limit: u64 },

    #[error("Observation error: {0}")]
    Observer(#[from] ObserverError),

    #[error("Failed to write output '{path}': {source}", path = path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
