use crate::core::models::system::SimulationState;
use nalgebra::Vector3;

/// A single-particle displacement that is rolled back unless committed.
///
/// The original position is recorded on creation. Dropping the guard without
/// calling [`TrialMove::commit`] restores it, so every early return out of a
/// trial move leaves the state untouched.
pub(crate) struct TrialMove<'a> {
    state: &'a mut SimulationState,
    particle: usize,
    original: Vector3<f64>,
    resolved: bool,
}

impl<'a> TrialMove<'a> {
    /// Records the current position of `particle` and applies `proposal`.
    pub fn apply(state: &'a mut SimulationState, particle: usize, proposal: Vector3<f64>) -> Self {
        let original = state.positions()[particle];
        state.set_position(particle, proposal);
        Self {
            state,
            particle,
            original,
            resolved: false,
        }
    }

    #[inline]
    pub fn state(&self) -> &SimulationState {
        self.state
    }

    pub fn commit(mut self) {
        self.resolved = true;
    }

    pub fn revert(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        self.state.set_position(self.particle, self.original);
        self.resolved = true;
    }
}

impl Drop for TrialMove<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.restore();
        }
    }
}
