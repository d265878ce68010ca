//! # Workflows Module
//!
//! Top-level entry points that run a complete simulation.
//!
//! - **Simulation Workflow** ([`simulate`]) - Builds the state, runs all sweeps and returns
//!   a [`simulate::RunSummary`]
//! - **Observation** ([`observer`]) - Periodic measurement and file output of observables

pub mod observer;
pub mod simulate;
