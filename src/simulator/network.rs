//! A network of neurons advanced in slices of the minimum connection delay.
use log;
use rayon::prelude::*;

use super::connection::Connection;
use super::source::{DcInput, PoissonInput};
use crate::core::neuron::IafPscExpMultisynapse;
use crate::core::recorder::Multimeter;
use crate::error::SNNError;

/// Minimum number of neurons to parallelize the computation.
pub const MIN_NEURONS_PAR: usize = 10;
/// Slice length (steps) of a network without connections.
pub const DEFAULT_SLICE_LENGTH: usize = 10;

/// A spike emitted by a neuron at a given step.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct SpikeEvent {
    pub neuron_id: usize,
    pub step: u64,
}

/// A network of neurons with delayed connections and external inputs.
///
/// Within a slice, neurons are independent: all spikes emitted during the slice are
/// delivered after every neuron completed it, which is valid as long as the slice is
/// not longer than the minimum connection delay.
#[derive(Debug, Clone)]
pub struct Network {
    resolution: f64,
    neurons: Vec<IafPscExpMultisynapse>,
    multimeters: Vec<Multimeter>,
    connections: Vec<Connection>,
    poisson_inputs: Vec<PoissonInput>,
    dc_inputs: Vec<DcInput>,
    /// The first step of the next slice.
    step: u64,
    spike_events: Vec<SpikeEvent>,
}

impl Network {
    /// Create an empty network with the time step `resolution` (ms).
    pub fn build(resolution: f64) -> Result<Self, SNNError> {
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(SNNError::InvalidParameter(
                "The time step must be strictly positive".to_string(),
            ));
        }
        Ok(Network {
            resolution,
            neurons: vec![],
            multimeters: vec![],
            connections: vec![],
            poisson_inputs: vec![],
            dc_inputs: vec![],
            step: 0,
            spike_events: vec![],
        })
    }

    /// Add a neuron to the network and returns its ID.
    pub fn add_neuron(&mut self, neuron: IafPscExpMultisynapse) -> usize {
        self.neurons.push(neuron);
        self.multimeters.push(Multimeter::new());
        self.neurons.len() - 1
    }

    /// Add a connection between two neurons of the network.
    /// The receptor is bound on the target neuron, so that its number of receptors can no
    /// longer be reduced.
    pub fn add_connection(
        &mut self,
        source_id: usize,
        target_id: usize,
        receptor: usize,
        weight: f64,
        delay: usize,
    ) -> Result<(), SNNError> {
        self.check_id(source_id)?;
        let connection = Connection::build(source_id, target_id, receptor, weight, delay)?;
        self.neuron_mut(target_id)?.bind_channel(receptor)?;
        self.connections.push(connection);
        Ok(())
    }

    /// Add a Poisson input to the network, bound to its target receptor.
    pub fn add_poisson_input(&mut self, input: PoissonInput) -> Result<(), SNNError> {
        self.neuron_mut(input.target_id())?
            .bind_channel(input.receptor())?;
        self.poisson_inputs.push(input);
        Ok(())
    }

    /// Add a constant current input to the network.
    pub fn add_dc_input(&mut self, input: DcInput) -> Result<(), SNNError> {
        self.check_id(input.target_id)?;
        self.dc_inputs.push(input);
        Ok(())
    }

    /// Attach a multimeter to a neuron, replacing the previous one.
    pub fn set_multimeter(&mut self, id: usize, multimeter: Multimeter) -> Result<(), SNNError> {
        self.check_id(id)?;
        self.multimeters[id] = multimeter;
        Ok(())
    }

    /// Returns the multimeter attached to a neuron.
    pub fn multimeter(&self, id: usize) -> Result<&Multimeter, SNNError> {
        self.multimeters
            .get(id)
            .ok_or_else(|| SNNError::OutOfBounds(format!("Neuron {} does not exist", id)))
    }

    /// Returns a reference to a neuron.
    pub fn neuron(&self, id: usize) -> Result<&IafPscExpMultisynapse, SNNError> {
        self.neurons
            .get(id)
            .ok_or_else(|| SNNError::OutOfBounds(format!("Neuron {} does not exist", id)))
    }

    /// Returns a mutable reference to a neuron.
    pub fn neuron_mut(&mut self, id: usize) -> Result<&mut IafPscExpMultisynapse, SNNError> {
        self.neurons
            .get_mut(id)
            .ok_or_else(|| SNNError::OutOfBounds(format!("Neuron {} does not exist", id)))
    }

    fn check_id(&self, id: usize) -> Result<(), SNNError> {
        self.neuron(id).map(|_| ())
    }

    /// Returns the time step (ms).
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Returns the number of neurons in the network.
    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    /// Returns the number of connections in the network.
    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    /// Returns the connections of the network.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns the first step of the next run.
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// Returns all spikes emitted so far, slice by slice and, within a slice, by neuron.
    pub fn spike_events(&self) -> &[SpikeEvent] {
        &self.spike_events
    }

    /// Returns the slice length, i.e., the minimum connection delay (steps).
    pub fn slice_length(&self) -> usize {
        self.connections
            .iter()
            .map(|connection| connection.delay)
            .min()
            .unwrap_or(DEFAULT_SLICE_LENGTH)
    }

    /// Run the network for the given number of steps.
    ///
    /// Neurons and inputs are calibrated first, so configuration changes between runs
    /// take effect. Staged inputs are preserved from one run to the next.
    pub fn run(&mut self, num_steps: u64) -> Result<(), SNNError> {
        let slice_length = self.slice_length();
        let end = self.step + num_steps;
        log::info!(
            "Simulating {} neurons for {} steps in slices of {} steps...",
            self.num_neurons(),
            num_steps,
            slice_length
        );

        for neuron in self.neurons.iter_mut() {
            neuron.calibrate(self.resolution)?;
        }
        for input in self.poisson_inputs.iter_mut() {
            input.calibrate(self.resolution)?;
        }

        let num_spikes = self.spike_events.len();
        while self.step < end {
            let to = (end - self.step).min(slice_length as u64) as usize;
            self.stage_inputs(to)?;
            let emitted = self.advance_neurons(to);
            self.deliver_spikes(&emitted, to)?;
            self.step += to as u64;
        }

        log::info!(
            "Simulation reached step {} with {} new spikes",
            self.step,
            self.spike_events.len() - num_spikes
        );
        Ok(())
    }

    /// Stage the external inputs of the next `to` steps.
    fn stage_inputs(&mut self, to: usize) -> Result<(), SNNError> {
        for lag in 0..to {
            for input in self.poisson_inputs.iter_mut() {
                let count = input.sample();
                if count > 0 {
                    self.neurons[input.target_id()].receive_spike(
                        input.receptor(),
                        lag,
                        input.weight() * count as f64,
                    )?;
                }
            }
            for input in self.dc_inputs.iter() {
                self.neurons[input.target_id].receive_current(lag, input.amplitude);
            }
        }
        Ok(())
    }

    /// Advance every neuron over the next `to` steps and returns the lags of their spikes.
    fn advance_neurons(&mut self, to: usize) -> Vec<Vec<usize>> {
        let origin = self.step;
        if self.num_neurons() > MIN_NEURONS_PAR {
            self.neurons
                .par_iter_mut()
                .zip(self.multimeters.par_iter_mut())
                .map(|(neuron, multimeter)| {
                    let mut lags: Vec<usize> = vec![];
                    neuron.advance(origin, 0, to, &mut lags, multimeter);
                    lags
                })
                .collect()
        } else {
            self.neurons
                .iter_mut()
                .zip(self.multimeters.iter_mut())
                .map(|(neuron, multimeter)| {
                    let mut lags: Vec<usize> = vec![];
                    neuron.advance(origin, 0, to, &mut lags, multimeter);
                    lags
                })
                .collect()
        }
    }

    /// Deliver the spikes emitted during the last slice of `to` steps.
    /// A spike emitted at a given lag reaches its target `delay` steps later, i.e., at an
    /// offset of `lag + delay - to` from the start of the next slice.
    fn deliver_spikes(&mut self, emitted: &[Vec<usize>], to: usize) -> Result<(), SNNError> {
        for (source_id, lags) in emitted.iter().enumerate() {
            for &lag in lags {
                self.spike_events.push(SpikeEvent {
                    neuron_id: source_id,
                    step: self.step + lag as u64 + 1,
                });
                for connection in self.connections.iter().filter(|c| c.source_id == source_id) {
                    self.neurons[connection.target_id].receive_spike(
                        connection.receptor,
                        lag + connection.delay - to,
                        connection.weight,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Reset the simulation clock and discard all staged inputs, spikes and recordings.
    /// Neuron parameters and states are kept.
    pub fn reset(&mut self) {
        self.step = 0;
        self.spike_events.clear();
        self.neurons.iter_mut().for_each(|neuron| neuron.init_buffers());
        self.multimeters.iter_mut().for_each(|multimeter| multimeter.clear());
    }
}
