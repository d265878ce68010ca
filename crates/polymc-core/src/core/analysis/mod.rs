pub mod observables;
pub mod spectrum;
