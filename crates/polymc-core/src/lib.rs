//! # polymc Core Library
//!
//! A Metropolis Monte Carlo engine for coarse-grained bead-spring polymers: open chains,
//! closed rings and two-dimensional meshes, held together by harmonic bonds and cosine
//! bending terms under free or periodic boundaries.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture so that each concern can be
//! tested on its own.
//!
//! - **[`core`]: The Foundation.** Stateless models and pure math: boundary geometry,
//!   the MT19937 generator, topologies and their adjacency index, bonded potentials and
//!   virials, observables, and file formats.
//!
//! - **[`engine`]: The Logic Core.** The stateful move engine. [`engine::evolver::Evolver`]
//!   performs sweeps of single-particle trial moves with local energy recomputation, and
//!   rolls back rejected moves through a trial-move guard.
//!
//! - **[`workflows`]: The Public API.** Complete runs: building the initial state, driving
//!   the sweep loop, and writing observables, restart files and summaries.

pub mod core;
pub mod engine;
pub mod workflows;
