//! # Core Module
//!
//! Stateless building blocks of the Monte Carlo engine.
//!
//! ## Architecture
//!
//! - **Geometry** ([`geometry`]) - Free and periodic boundaries, minimum image, distances and angles
//! - **Randomness** ([`random`]) - The MT19937 generator that drives every stochastic decision
//! - **Models** ([`models`]) - Topologies, the adjacency index, the simulation state and starting layouts
//! - **Energy** ([`forcefield`]) - Bond and angle potentials, virials and the [`forcefield::scoring::Scorer`]
//! - **Observables** ([`analysis`]) - Radius of gyration, end-to-end distance, fluctuation spectra
//! - **File I/O** ([`io`]) - Binary restart files, XYZ trajectories and topology dumps

pub mod analysis;
pub mod forcefield;
pub mod geometry;
pub mod io;
pub mod models;
pub mod random;
