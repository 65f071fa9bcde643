//! Module implementing the leaky integrate-and-fire neuron with exponential
//! synaptic currents on an arbitrary number of receptors.
//!
//! The sub-threshold dynamics are integrated exactly on a fixed grid: each step
//! multiplies the state by the propagators computed in [`IafPscExpMultisynapse::calibrate`].
//! Incoming spikes and currents are staged in per-receptor buffers and consumed
//! by [`IafPscExpMultisynapse::advance`] at the step they are destined for.
use derivative::Derivative;
use itertools::{izip, Itertools};
use serde::{Deserialize, Serialize};

use super::buffer::RingBuffer;
use super::history::SpikeHistory;
use super::parameters::{ParameterUpdate, Parameters};
use super::propagator::Propagators;
use super::recorder::{DataLogger, SpikeSink};
use super::state::State;
use crate::error::SNNError;

/// A read-back of every field of a neuron, potentials in absolute terms.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Status {
    #[serde(rename = "E_L")]
    pub e_l: f64,
    #[serde(rename = "I_e")]
    pub i_e: f64,
    #[serde(rename = "V_th")]
    pub v_th: f64,
    #[serde(rename = "V_reset")]
    pub v_reset: f64,
    #[serde(rename = "C_m")]
    pub c_m: f64,
    pub tau_m: f64,
    pub t_ref: f64,
    pub tau_syn: Vec<f64>,
    pub n_synapses: usize,
    pub has_connections: bool,
    #[serde(rename = "V_m")]
    pub v_m: f64,
}

fn empty_buffers(buffers: &[RingBuffer]) -> Vec<RingBuffer> {
    vec![RingBuffer::new(); buffers.len()]
}

fn empty_buffer(_buffer: &RingBuffer) -> RingBuffer {
    RingBuffer::new()
}

fn empty_history(_history: &SpikeHistory) -> SpikeHistory {
    SpikeHistory::new()
}

/// A leaky integrate-and-fire neuron with exponential post-synaptic currents.
///
/// Cloning copies the parameters, the state and the propagators; staged inputs and
/// the spike history are not carried over.
#[derive(Derivative)]
#[derivative(Debug, Clone, PartialEq)]
pub struct IafPscExpMultisynapse {
    parameters: Parameters,
    state: State,
    propagators: Propagators,
    /// The 1-based port of each receptor, assigned at calibration.
    receptor_types: Vec<usize>,
    /// One buffer of incoming spike weights per receptor.
    #[derivative(Clone(clone_with = "empty_buffers"), PartialEq = "ignore")]
    spikes: Vec<RingBuffer>,
    /// Incoming external currents.
    #[derivative(Clone(clone_with = "empty_buffer"), PartialEq = "ignore")]
    currents: RingBuffer,
    #[derivative(Clone(clone_with = "empty_history"), PartialEq = "ignore")]
    history: SpikeHistory,
}

impl Default for IafPscExpMultisynapse {
    fn default() -> Self {
        IafPscExpMultisynapse::new()
    }
}

impl IafPscExpMultisynapse {
    /// Create a neuron at rest with default parameters and no receptor.
    pub fn new() -> Self {
        IafPscExpMultisynapse::from_snapshot(Parameters::default(), State::default())
    }

    /// Create a neuron at rest with default parameters and the given synaptic time constants.
    pub fn build(tau_syn: &[f64]) -> Result<Self, SNNError> {
        let parameters = Parameters::build(tau_syn)?;
        let state = State::new(parameters.num_receptors());
        Ok(IafPscExpMultisynapse::from_snapshot(parameters, state))
    }

    /// Create a neuron from a parameter and state snapshot.
    /// The neuron must be calibrated before being advanced.
    pub fn from_snapshot(parameters: Parameters, state: State) -> Self {
        IafPscExpMultisynapse {
            parameters,
            state,
            propagators: Propagators::default(),
            receptor_types: vec![],
            spikes: vec![],
            currents: RingBuffer::new(),
            history: SpikeHistory::new(),
        }
    }

    /// Apply a partial configuration update.
    ///
    /// A change of the resting potential is carried over to the membrane potential so
    /// that its absolute value is preserved, unless `V_m` is explicitly provided.
    /// On error, neither the parameters nor the state are modified.
    pub fn set_status(&mut self, update: &ParameterUpdate) -> Result<(), SNNError> {
        let mut parameters = self.parameters.clone();
        let delta_e_l = parameters.set(update)?;
        let mut state = self.state.clone();
        state.set(update, &parameters, delta_e_l);

        log::debug!("Neuron configured with {:?}", update.fields());
        self.parameters = parameters;
        self.state = state;
        Ok(())
    }

    /// Returns every field of the neuron, potentials in absolute terms.
    pub fn status(&self) -> Status {
        Status {
            e_l: self.parameters.e_l(),
            i_e: self.parameters.i_e(),
            v_th: self.parameters.v_th(),
            v_reset: self.parameters.v_reset(),
            c_m: self.parameters.c_m(),
            tau_m: self.parameters.tau_m(),
            t_ref: self.parameters.t_ref(),
            tau_syn: self.parameters.tau_syn().to_vec(),
            n_synapses: self.parameters.num_receptors(),
            has_connections: self.parameters.has_connections(),
            v_m: self.v_m(),
        }
    }

    /// Compute the propagators for the time step `h` (ms) and size the receptor
    /// structures to the current number of receptors.
    /// Must be called after any configuration change and before advancing.
    pub fn calibrate(&mut self, h: f64) -> Result<(), SNNError> {
        if !(h > 0.0) {
            return Err(SNNError::InvalidParameter(
                "The time step must be strictly positive".to_string(),
            ));
        }

        let num_receptors = self.parameters.num_receptors();
        self.receptor_types = (1..=num_receptors).collect();
        self.state.resize(num_receptors);
        self.spikes.resize_with(num_receptors, RingBuffer::new);
        self.propagators = Propagators::new(&self.parameters, h);

        log::debug!(
            "Neuron calibrated with h = {} ms, {} receptors and {} refractory steps",
            h,
            num_receptors,
            self.propagators.refractory_counts()
        );
        Ok(())
    }

    /// Copy the dynamic state of a prototype neuron.
    pub fn init_state_from(&mut self, prototype: &IafPscExpMultisynapse) {
        self.state = prototype.state.clone();
    }

    /// Discard all staged inputs and the spike history.
    pub fn init_buffers(&mut self) {
        self.spikes.iter_mut().for_each(|buffer| buffer.clear());
        self.currents.clear();
        self.history.clear();
    }

    /// Bind an incoming connection to the given receptor port (1-based).
    /// Once a receptor is bound, the number of receptors can no longer be reduced.
    pub fn bind_channel(&mut self, receptor: usize) -> Result<usize, SNNError> {
        if receptor == 0 || receptor > self.parameters.num_receptors() {
            return Err(SNNError::InvalidChannel(format!(
                "Receptor {} is not in [1, {}]",
                receptor,
                self.parameters.num_receptors()
            )));
        }
        self.parameters.has_connections = true;
        Ok(receptor)
    }

    /// Stage a spike weight on the given receptor port (1-based), `offset` steps after
    /// the first step of the next update.
    pub fn receive_spike(
        &mut self,
        receptor: usize,
        offset: usize,
        weight: f64,
    ) -> Result<(), SNNError> {
        match receptor
            .checked_sub(1)
            .and_then(|k| self.spikes.get_mut(k))
        {
            Some(buffer) => {
                buffer.add_value(offset, weight);
                Ok(())
            }
            None => Err(SNNError::InvalidChannel(format!(
                "Receptor {} is not in [1, {}]",
                receptor,
                self.spikes.len()
            ))),
        }
    }

    /// Stage an external current, `offset` steps after the first step of the next update.
    pub fn receive_current(&mut self, offset: usize, current: f64) {
        self.currents.add_value(offset, current);
    }

    /// Advance the neuron over the steps `origin + from .. origin + to`.
    ///
    /// Spikes are reported to the sink with their lag within the range and recorded in
    /// the spike history one step after the lag. The logger is called at every step.
    ///
    /// # Panics
    ///
    /// Panics if the step range is empty, or if the neuron was not calibrated since its
    /// number of receptors last changed.
    pub fn advance<S: SpikeSink, L: DataLogger>(
        &mut self,
        origin: u64,
        from: usize,
        to: usize,
        sink: &mut S,
        logger: &mut L,
    ) {
        assert!(from < to, "Invalid step range: {} must be smaller than {}", from, to);
        assert_eq!(
            self.propagators.p11.len(),
            self.parameters.num_receptors(),
            "The neuron must be calibrated before being advanced"
        );

        for lag in from..to {
            let parameters = &self.parameters;
            let propagators = &self.propagators;
            let state = &mut self.state;

            if state.refractory_steps == 0 {
                state.v_m = state.v_m * propagators.p22
                    + (parameters.i_e + state.i_const) * propagators.p20;

                state.i_syn_sum = 0.0;
                for (p21, i_syn) in propagators.p21.iter().zip_eq(state.i_syn.iter()) {
                    state.v_m += p21 * i_syn;
                    state.i_syn_sum += i_syn;
                }
            } else {
                state.refractory_steps -= 1;
            }

            for (i_syn, p11, buffer) in izip!(
                state.i_syn.iter_mut(),
                propagators.p11.iter(),
                self.spikes.iter_mut()
            ) {
                *i_syn = *i_syn * p11 + buffer.get_value();
            }

            if state.v_m >= parameters.theta {
                state.refractory_steps = propagators.refractory_counts;
                state.v_m = parameters.v_reset;

                self.history.record(origin + lag as u64 + 1);
                sink.send(lag);
            }

            state.i_const = self.currents.get_value();

            logger.record(origin + lag as u64, self);
        }
    }

    /// Returns the absolute membrane potential (mV).
    pub fn v_m(&self) -> f64 {
        self.state.v_m + self.parameters.e_l
    }

    /// Returns the sum of the synaptic currents at the last integration step (pA).
    pub fn i_syn_sum(&self) -> f64 {
        self.state.i_syn_sum
    }

    /// Returns the parameters of the neuron.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the state of the neuron.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the propagators of the last calibration.
    pub fn propagators(&self) -> &Propagators {
        &self.propagators
    }

    /// Returns the receptor ports assigned at the last calibration.
    pub fn receptor_types(&self) -> &[usize] {
        &self.receptor_types
    }

    /// Returns the spike history of the neuron.
    pub fn history(&self) -> &SpikeHistory {
        &self.history
    }
}
