use super::config::SimulationConfig;
use super::error::EngineError;
use super::transaction::TrialMove;
use crate::core::forcefield::params::ForcefieldParams;
use crate::core::forcefield::scoring::Scorer;
use crate::core::models::configuration::Dimensionality;
use crate::core::models::system::SimulationState;
use crate::core::random::mt19937::Mt19937;
use nalgebra::Vector3;
use tracing::{debug, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    Idle,
    SweepRunning,
    SweepComplete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOutcome {
    pub sweep: u64,
    pub attempted: usize,
    pub accepted: usize,
    pub acceptance_ratio: f64,
}

/// Metropolis criterion for an energy change in thermal units.
///
/// Downhill moves are accepted without consuming a draw; otherwise one
/// `[0, 1)` draw is compared against `exp(-delta_e)`.
#[inline]
pub fn metropolis_accept(delta_e: f64, rng: &mut Mt19937) -> bool {
    if delta_e < 0.0 {
        return true;
    }
    rng.next_real01_half() < (-delta_e).exp()
}

/// Range of particle ids eligible for trial moves.
///
/// Under a periodic boundary the first and the last particle are never picked.
#[inline]
pub fn movable_range(state: &SimulationState) -> (u32, u32) {
    let last = state.num_particles().saturating_sub(1) as u32;
    if state.boundary().is_periodic() {
        (1, last.saturating_sub(1))
    } else {
        (0, last)
    }
}

/// Single-particle Metropolis Monte Carlo driver.
///
/// Owns the run's random stream; all randomness of a run, including the
/// generation of a random starting configuration, is drawn from it in a fixed
/// order so a seed fully determines the trajectory.
pub struct Evolver {
    rng: Mt19937,
    forcefield: ForcefieldParams,
    step_length: f64,
    dimensionality: Dimensionality,
    total_sweeps: u64,
    sweeps_completed: u64,
    phase: SweepPhase,
}

impl Evolver {
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_rng(config, Mt19937::new(config.sampling.seed))
    }

    pub fn with_rng(config: &SimulationConfig, rng: Mt19937) -> Self {
        Self {
            rng,
            forcefield: config.forcefield,
            step_length: config.sampling.step_length,
            dimensionality: config.sampling.dimensionality,
            total_sweeps: config.sampling.total_sweeps,
            sweeps_completed: 0,
            phase: SweepPhase::Idle,
        }
    }

    #[inline]
    pub fn rng_mut(&mut self) -> &mut Mt19937 {
        &mut self.rng
    }

    #[inline]
    pub fn phase(&self) -> SweepPhase {
        self.phase
    }

    #[inline]
    pub fn sweeps_completed(&self) -> u64 {
        self.sweeps_completed
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.sweeps_completed >= self.total_sweeps
    }

    /// Runs one sweep of `N` trial moves and stores the acceptance ratio in
    /// `state`.
    #[instrument(skip_all, name = "sweep", fields(sweep = self.sweeps_completed))]
    pub fn sweep(&mut self, state: &mut SimulationState) -> Result<SweepOutcome, EngineError> {
        if self.is_finished() {
            return Err(EngineError::SweepLimitReached {
                limit: self.total_sweeps,
            });
        }

        self.phase = SweepPhase::SweepRunning;
        let attempted = state.num_particles();
        let (lo, hi) = movable_range(state);
        let mut accepted = 0;

        for _ in 0..attempted {
            let particle = self.rng.next_int_range(lo, hi) as usize;
            match self.trial_move(state, particle) {
                Ok(true) => accepted += 1,
                Ok(false) => {}
                Err(e) => {
                    self.phase = SweepPhase::Idle;
                    return Err(e);
                }
            }
        }

        let acceptance_ratio = accepted as f64 / attempted as f64;
        state.set_acceptance_ratio(acceptance_ratio);
        let outcome = SweepOutcome {
            sweep: self.sweeps_completed,
            attempted,
            accepted,
            acceptance_ratio,
        };
        self.sweeps_completed += 1;
        self.phase = SweepPhase::SweepComplete;
        debug!(
            "Sweep {} finished: {}/{} moves accepted ({:.4}).",
            outcome.sweep, accepted, attempted, acceptance_ratio
        );
        Ok(outcome)
    }

    fn displacement(&mut self) -> Vector3<f64> {
        let step = self.step_length;
        let dx = step * (2.0 * self.rng.next_real01_half() - 1.0);
        let dy = step * (2.0 * self.rng.next_real01_half() - 1.0);
        let dz = match self.dimensionality {
            Dimensionality::Spatial => step * (2.0 * self.rng.next_real01_half() - 1.0),
            Dimensionality::Planar => 0.0,
        };
        Vector3::new(dx, dy, dz)
    }

    /// Attempts to displace `particle`; returns whether the move was kept.
    fn trial_move(
        &mut self,
        state: &mut SimulationState,
        particle: usize,
    ) -> Result<bool, EngineError> {
        let kick = self.displacement();
        self.try_displacement(state, particle, kick)
    }

    fn try_displacement(
        &mut self,
        state: &mut SimulationState,
        particle: usize,
        kick: Vector3<f64>,
    ) -> Result<bool, EngineError> {
        let boundary = *state.boundary();
        let forcefield = self.forcefield;
        let scorer = Scorer::new(&forcefield, &boundary);

        let before = scorer.local_energy(state.positions(), state.adjacency(), particle);
        let original = state.positions()[particle];
        let proposal = boundary.wrap(&(original + kick));

        let trial = TrialMove::apply(state, particle, proposal);
        let after = scorer.local_energy(
            trial.state().positions(),
            trial.state().adjacency(),
            particle,
        );
        if !before.is_finite() || !after.is_finite() {
            trial.revert();
            return Err(EngineError::NonFiniteEnergy {
                particle,
                sweep: self.sweeps_completed,
            });
        }

        let delta_e = after.total() - before.total();
        let accepted = metropolis_accept(delta_e, &mut self.rng);
        trace!(particle, delta_e, accepted, "trial move");
        if accepted {
            trial.commit();
        } else {
            trial.revert();
        }
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::BondPotential;
    use crate::core::geometry::boundary::{Boundary, BoundaryKind};
    use crate::core::models::configuration::{InitialLayout, straight_chain};
    use crate::core::models::topology::Topology;
    use crate::engine::config::SimulationConfigBuilder;
    use std::path::PathBuf;

    fn config(
        step_length: f64,
        k_bond: f64,
        k_angle: f64,
        sweeps: u64,
        seed: u32,
    ) -> SimulationConfig {
        SimulationConfigBuilder::new()
            .num_particles(10)
            .layout(InitialLayout::StraightChain)
            .boundary(BoundaryKind::Free)
            .bond_potential(BondPotential::FiniteRestLength)
            .bond_length(1.0)
            .k_bond(k_bond)
            .k_angle(k_angle)
            .step_length(step_length)
            .total_sweeps(sweeps)
            .seed(seed)
            .micro_interval(1)
            .macro_interval(1)
            .output_directory(PathBuf::from("unused"))
            .build()
            .unwrap()
    }

    fn straight_state(n: usize, boundary: Boundary) -> SimulationState {
        let topology = Topology::chain(n, boundary.is_periodic()).unwrap();
        SimulationState::new(straight_chain(n, 1.0), topology, boundary).unwrap()
    }

    #[test]
    fn zero_step_moves_are_always_accepted() {
        let config = config(0.0, 1.0, 0.0, 5, 5489);
        let mut evolver = Evolver::new(&config);
        let mut state = straight_state(10, Boundary::free());
        for sweep in 0..5 {
            let outcome = evolver.sweep(&mut state).unwrap();
            assert_eq!(outcome.sweep, sweep);
            assert_eq!(outcome.acceptance_ratio, 1.0);
            assert_eq!(state.acceptance_ratio(), 1.0);
        }
        assert_eq!(state.positions(), straight_chain(10, 1.0).as_slice());
    }

    #[test]
    fn sweeps_beyond_the_limit_are_refused() {
        let config = config(0.1, 1.0, 0.0, 2, 1);
        let mut evolver = Evolver::new(&config);
        let mut state = straight_state(10, Boundary::free());
        assert_eq!(evolver.phase(), SweepPhase::Idle);
        evolver.sweep(&mut state).unwrap();
        assert_eq!(evolver.phase(), SweepPhase::SweepComplete);
        evolver.sweep(&mut state).unwrap();
        assert!(evolver.is_finished());
        assert!(matches!(
            evolver.sweep(&mut state),
            Err(EngineError::SweepLimitReached { limit: 2 })
        ));
    }

    #[test]
    fn acceptance_ratio_is_accepted_over_attempted() {
        let config = config(0.5, 5.0, 2.0, 20, 77);
        let mut evolver = Evolver::new(&config);
        let mut state = straight_state(10, Boundary::free());
        for _ in 0..20 {
            let outcome = evolver.sweep(&mut state).unwrap();
            assert_eq!(outcome.attempted, 10);
            assert_eq!(
                outcome.acceptance_ratio,
                outcome.accepted as f64 / outcome.attempted as f64
            );
            assert!((0.0..=1.0).contains(&outcome.acceptance_ratio));
        }
    }

    #[test]
    fn same_seed_gives_the_same_trajectory() {
        let config = config(0.3, 2.0, 1.0, 10, 2024);
        let run = || {
            let mut evolver = Evolver::new(&config);
            let mut state = straight_state(10, Boundary::free());
            for _ in 0..10 {
                evolver.sweep(&mut state).unwrap();
            }
            state.positions().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn large_energy_increase_is_never_accepted() {
        for seed in 0..2000u32 {
            let mut rng = Mt19937::new(seed);
            assert!(!metropolis_accept(60.0, &mut rng));
        }
    }

    #[test]
    fn steep_uphill_displacement_is_rejected_and_restored() {
        let config = config(1.0, 1000.0, 0.0, 1, 0);
        let kick = Vector3::new(0.0, 1.0, 0.0);
        let reference = straight_state(3, Boundary::free());

        let forcefield = config.forcefield;
        let scorer = Scorer::new(&forcefield, reference.boundary());
        let mut displaced = reference.positions().to_vec();
        displaced[1] += kick;
        let delta_e = scorer.total_energy(&displaced, reference.topology()).total()
            - scorer
                .total_energy(reference.positions(), reference.topology())
                .total();
        assert!(delta_e > 50.0, "delta_e = {delta_e}");

        for seed in 0..1000u32 {
            let mut evolver = Evolver::with_rng(&config, Mt19937::new(seed));
            let mut state = reference.clone();
            let accepted = evolver.try_displacement(&mut state, 1, kick).unwrap();
            assert!(!accepted, "seed {seed} accepted a move with delta_e = {delta_e}");
            assert_eq!(state.positions(), reference.positions());
        }
    }

    #[test]
    fn downhill_moves_are_accepted_without_a_draw() {
        let mut rng = Mt19937::new(9);
        let mut reference = Mt19937::new(9);
        assert!(metropolis_accept(-0.1, &mut rng));
        assert_eq!(rng.next_u32(), reference.next_u32());
    }

    #[test]
    fn stiff_chain_rejects_most_large_moves() {
        let config = config(2.0, 500.0, 0.0, 10, 3);
        let mut evolver = Evolver::new(&config);
        let mut state = straight_state(10, Boundary::free());
        let mut accepted = 0;
        for _ in 0..10 {
            accepted += evolver.sweep(&mut state).unwrap().accepted;
        }
        assert!(accepted < 20, "accepted {accepted} of 100 stiff moves");
    }

    #[test]
    fn periodic_runs_never_move_the_end_particles() {
        let mut config = config(0.4, 1.0, 0.5, 30, 11);
        config.system.boundary = BoundaryKind::Periodic;
        let boundary = Boundary::periodic(Vector3::new(10.0, 10.0, 0.0)).unwrap();
        let mut state = straight_state(10, boundary);
        let first = state.positions()[0];
        let last = state.positions()[9];
        let mut evolver = Evolver::new(&config);
        for _ in 0..30 {
            evolver.sweep(&mut state).unwrap();
        }
        assert_eq!(state.positions()[0], first);
        assert_eq!(state.positions()[9], last);
        assert!(state.positions().iter().all(|p| p.x >= 0.0 && p.x < 10.0));
    }

    #[test]
    fn planar_moves_keep_z_fixed() {
        let config = config(0.5, 1.0, 1.0, 10, 8);
        let mut evolver = Evolver::new(&config);
        let mut state = straight_state(10, Boundary::free());
        for _ in 0..10 {
            evolver.sweep(&mut state).unwrap();
        }
        assert!(state.positions().iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn spatial_moves_leave_the_plane() {
        let mut config = config(0.5, 1.0, 1.0, 10, 8);
        config.sampling.dimensionality = Dimensionality::Spatial;
        let mut evolver = Evolver::new(&config);
        let mut state = straight_state(10, Boundary::free());
        for _ in 0..10 {
            evolver.sweep(&mut state).unwrap();
        }
        assert!(state.positions().iter().any(|p| p.z != 0.0));
    }

    #[test]
    fn coincident_particles_abort_with_non_finite_energy() {
        let config = config(0.0, 1.0, 1.0, 1, 4);
        let mut evolver = Evolver::new(&config);
        let topology = Topology::chain(3, false).unwrap();
        let positions = vec![Vector3::zeros(); 3];
        let mut state = SimulationState::new(positions, topology, Boundary::free()).unwrap();
        let result = evolver.sweep(&mut state);
        assert!(matches!(result, Err(EngineError::NonFiniteEnergy { .. })));
        assert!(state.positions().iter().all(|p| *p == Vector3::zeros()));
        assert_eq!(evolver.phase(), SweepPhase::Idle);
    }

    #[test]
    fn movable_range_depends_on_boundary() {
        let free = straight_state(6, Boundary::free());
        assert_eq!(movable_range(&free), (0, 5));
        let periodic =
            straight_state(6, Boundary::periodic(Vector3::new(10.0, 10.0, 0.0)).unwrap());
        assert_eq!(movable_range(&periodic), (1, 4));
    }
}
