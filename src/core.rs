//! Core module defining the components of the neuron model.
//!
//! The neuron is a leaky integrate-and-fire neuron with exponentially decaying synaptic
//! currents on an arbitrary number of receptors, integrated exactly on a fixed time grid.
//! It consists of the following components:
//!
//! - [`parameters`]: The static configuration of a neuron and its partial updates
//! - [`state`]: The dynamic state mutated at every step
//! - [`propagator`]: The exact integration coefficients for a given time step
//! - [`buffer`]: Delayed staging of incoming spikes and currents
//! - [`history`]: The spike-time archive
//! - [`recorder`]: The interfaces through which spikes and recordables are reported
//! - [`neuron`]: The neuron itself, tying the above together
//!
//! # Examples
//!
//! ```
//! use rusty_iaf::core::neuron::IafPscExpMultisynapse;
//! use rusty_iaf::core::parameters::ParameterUpdate;
//! use rusty_iaf::core::recorder::NullLogger;
//!
//! // Create a neuron with two receptors
//! let mut neuron = IafPscExpMultisynapse::build(&[0.5, 2.0]).unwrap();
//!
//! // Drive it with a strong background current
//! let update = ParameterUpdate { i_e: Some(1000.0), ..Default::default() };
//! neuron.set_status(&update).unwrap();
//!
//! // Compute the propagators for a time step of 0.1 ms and simulate 20 ms
//! neuron.calibrate(0.1).unwrap();
//! let mut spikes: Vec<usize> = vec![];
//! neuron.advance(0, 0, 200, &mut spikes, &mut NullLogger);
//!
//! assert!(!spikes.is_empty());
//! assert_eq!(neuron.history().num_spikes(), spikes.len());
//! ```
pub mod buffer;
pub mod history;
pub mod neuron;
pub mod parameters;
pub mod propagator;
pub mod recorder;
pub mod state;
