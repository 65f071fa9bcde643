//! Simulation framework for networks of neurons.
//!
//! This module provides three main components:
//! - `connection`: Delayed connections between neurons.
//! - `source`: External stimulation devices (Poisson spike trains and constant currents).
//! - `network`: A network advancing its neurons in slices of the minimum connection delay.
//!
//! # Example
//! ```rust
//! use rusty_iaf::core::neuron::IafPscExpMultisynapse;
//! use rusty_iaf::core::recorder::Multimeter;
//! use rusty_iaf::simulator::network::Network;
//! use rusty_iaf::simulator::source::PoissonInput;
//!
//! // Create a network with a time step of 0.1 ms
//! let mut network = Network::build(0.1).unwrap();
//!
//! // Add two neurons with an excitatory (fast) and an inhibitory (slow) receptor each
//! let n0 = network.add_neuron(IafPscExpMultisynapse::build(&[2.0, 8.0]).unwrap());
//! let n1 = network.add_neuron(IafPscExpMultisynapse::build(&[2.0, 8.0]).unwrap());
//!
//! // Drive the first neuron with a Poisson spike train and connect it to the second one
//! network.add_poisson_input(PoissonInput::build(n0, 1, 8000.0, 100.0, 42).unwrap()).unwrap();
//! network.add_connection(n0, n1, 1, 500.0, 15).unwrap();
//! network.set_multimeter(n1, Multimeter::build(&["V_m", "I_syn"], 10).unwrap()).unwrap();
//!
//! // Simulate 100 ms
//! network.run(1000).unwrap();
//! assert_eq!(network.multimeter(n1).unwrap().samples().len(), 100);
//! ```
pub mod connection;
pub mod network;
pub mod source;
