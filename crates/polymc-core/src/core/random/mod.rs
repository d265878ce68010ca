//! Deterministic pseudo-random numbers.
//!
//! Reproducibility of a run depends on [`mt19937::Mt19937`] producing the exact reference
//! sequence for a given seed; do not substitute another generator.

pub mod mt19937;
