//! # Engine Module
//!
//! The Metropolis move engine.
//!
//! ## Overview
//!
//! A sweep consists of `N` single-particle trial moves. Each move picks a particle, kicks it
//! by a uniform displacement, re-evaluates only the bonds and angles that touch it, and
//! accepts or rejects the kick with the Metropolis criterion. Rejected moves are rolled back
//! by a guard that restores the recorded position.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Run parameters and their builder
//! - **Move Engine** ([`evolver`]) - Sweeps, trial moves and the acceptance test
//! - **Progress Monitoring** ([`progress`]) - Callbacks for front ends
//! - **Error Handling** ([`error`]) - Engine-level error type

pub mod config;
pub mod error;
pub mod evolver;
pub mod progress;
pub(crate) mod transaction;
