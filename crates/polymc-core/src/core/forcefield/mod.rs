//! # Force Field Module
//!
//! Bonded interactions of the coarse-grained model, in thermal units (`kT = 1`).
//!
//! - **Bonds** - harmonic springs, either ideal (`0.5 k r²`) or with a finite rest length
//!   (`0.5 k (r - l0)²`)
//! - **Angles** - cosine bending `k (1 - cos θ)` on every consecutive triple
//!
//! ## Key Components
//!
//! - [`params`] - Force constants and the bond functional form
//! - [`potentials`] - Pure energy and virial functions
//! - [`term`] - Energy aggregation per interaction type
//! - [`scoring`] - Local, total and virial evaluation over a topology
//!
//! ```ignore
//! use polymc::core::forcefield::scoring::Scorer;
//!
//! let scorer = Scorer::new(&params, &boundary);
//! let local = scorer.local_energy(state.positions(), adjacency, particle);
//! ```

pub mod params;
pub(crate) mod potentials;
pub mod scoring;
pub mod term;
