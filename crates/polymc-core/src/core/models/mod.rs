//! # Core Models Module
//!
//! Data structures describing the polymer being simulated.
//!
//! ## Key Components
//!
//! - [`topology`] - Bond and angle lists for chains, rings and toroidal meshes
//! - [`adjacency`] - Per-particle incident-term index used for local energy updates
//! - [`system`] - [`system::SimulationState`], the owned aggregate mutated by the engine
//! - [`configuration`] - Starting layouts (straight chain, random walk, ring, flat mesh)

pub mod adjacency;
pub mod configuration;
pub mod system;
pub mod topology;
