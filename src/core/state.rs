//! Module implementing the dynamic state of a neuron.
use serde::{Deserialize, Serialize};

use super::parameters::{ParameterUpdate, Parameters};

/// The state of a neuron, mutated at every time step.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Membrane potential, relative to the resting potential (mV).
    pub(crate) v_m: f64,
    /// Synaptic current of each receptor (pA).
    pub(crate) i_syn: Vec<f64>,
    /// Sum of the synaptic currents at the last integration step (pA).
    pub(crate) i_syn_sum: f64,
    /// External current, latched for the next step (pA).
    pub(crate) i_const: f64,
    /// Number of remaining refractory steps, zero when integrating.
    pub(crate) refractory_steps: usize,
}

impl State {
    /// Create a state at rest with the given number of receptors.
    pub fn new(num_receptors: usize) -> Self {
        State {
            i_syn: vec![0.0; num_receptors],
            ..Default::default()
        }
    }

    /// Apply the membrane potential part of a configuration update.
    ///
    /// An explicit `V_m` is absolute and is stored relative to the (new) resting
    /// potential; otherwise, the potential is rebased by the rest shift `delta_e_l`.
    pub fn set(&mut self, update: &ParameterUpdate, parameters: &Parameters, delta_e_l: f64) {
        match update.v_m {
            Some(v_m) => self.v_m = v_m - parameters.e_l,
            None => self.rebase(delta_e_l),
        }
    }

    /// Shift the membrane potential so that it keeps its absolute value after the
    /// resting potential moved by `delta_e_l`.
    pub fn rebase(&mut self, delta_e_l: f64) {
        self.v_m -= delta_e_l;
    }

    /// Resize the synaptic currents to the given number of receptors.
    /// Existing receptors keep their current, new ones start at zero.
    pub fn resize(&mut self, num_receptors: usize) {
        self.i_syn.resize(num_receptors, 0.0);
    }

    /// Returns the membrane potential relative to rest (mV).
    pub fn v_m(&self) -> f64 {
        self.v_m
    }

    /// Returns the synaptic currents (pA).
    pub fn i_syn(&self) -> &[f64] {
        &self.i_syn
    }

    /// Returns the sum of the synaptic currents at the last integration step (pA).
    pub fn i_syn_sum(&self) -> f64 {
        self.i_syn_sum
    }

    /// Returns the external current latched for the next step (pA).
    pub fn i_const(&self) -> f64 {
        self.i_const
    }

    /// Returns the number of remaining refractory steps.
    pub fn refractory_steps(&self) -> usize {
        self.refractory_steps
    }

    /// Whether the neuron is refractory.
    pub fn is_refractory(&self) -> bool {
        self.refractory_steps > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_state_rebase() {
        let mut parameters = Parameters::default();
        let mut state = State::new(2);
        state.v_m = 3.0;

        let update = ParameterUpdate { e_l: Some(-65.0), ..Default::default() };
        let delta = parameters.set(&update).unwrap();
        state.set(&update, &parameters, delta);

        // Absolute potential is still -67 mV.
        assert_relative_eq!(state.v_m() + parameters.e_l(), -67.0);
        assert_relative_eq!(state.v_m(), -2.0);
    }

    #[test]
    fn test_state_explicit_potential() {
        let mut parameters = Parameters::default();
        let mut state = State::new(0);

        let update = ParameterUpdate { e_l: Some(-60.0), v_m: Some(-58.0), ..Default::default() };
        let delta = parameters.set(&update).unwrap();
        state.set(&update, &parameters, delta);
        assert_relative_eq!(state.v_m(), 2.0);
    }

    #[test]
    fn test_state_resize() {
        let mut state = State::new(2);
        state.i_syn = vec![1.0, 2.0];
        state.resize(3);
        assert_eq!(state.i_syn(), &[1.0, 2.0, 0.0]);
        assert!(!state.is_refractory());
    }
}
