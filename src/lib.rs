//! This crate provides a leaky integrate-and-fire neuron with exponentially decaying
//! synaptic currents on an arbitrary number of receptors, integrated exactly on a fixed
//! time grid, together with the tools to simulate networks of such neurons in Rust.
//!
//! # Configuring Neurons
//!
//! ## From Scratch
//!
//! ```rust
//! use rusty_iaf::core::neuron::IafPscExpMultisynapse;
//! use rusty_iaf::core::parameters::ParameterUpdate;
//!
//! // Create a neuron with three receptors of different time constants
//! let mut neuron = IafPscExpMultisynapse::build(&[0.2, 2.0, 20.0]).unwrap();
//!
//! // Move the resting potential; reset, threshold and membrane potential keep their absolute values
//! let mut update = ParameterUpdate::new();
//! update.set_scalar("E_L", -65.0).unwrap();
//! neuron.set_status(&update).unwrap();
//!
//! let status = neuron.status();
//! assert_eq!(status.e_l, -65.0);
//! assert_eq!(status.v_reset, -70.0);
//! assert_eq!(status.v_th, -55.0);
//! assert_eq!(status.v_m, -70.0);
//! assert_eq!(status.n_synapses, 3);
//! ```
//!
//! ## From a File
//!
//! ```rust
//! use rusty_iaf::core::parameters::ParameterUpdate;
//!
//! let update = ParameterUpdate::from_json(r#"{"tau_syn": [0.5, 5.0], "V_th": -50.0}"#).unwrap();
//! assert_eq!(update.v_th, Some(-50.0));
//! ```
//!
//! # Simulating Networks
//!
//! ```rust
//! use rusty_iaf::core::neuron::IafPscExpMultisynapse;
//! use rusty_iaf::simulator::network::Network;
//! use rusty_iaf::simulator::source::DcInput;
//!
//! let mut network = Network::build(0.1).unwrap();
//! let n0 = network.add_neuron(IafPscExpMultisynapse::build(&[2.0]).unwrap());
//! let n1 = network.add_neuron(IafPscExpMultisynapse::build(&[2.0]).unwrap());
//! network.add_dc_input(DcInput::build(n0, 1000.0).unwrap()).unwrap();
//! network.add_connection(n0, n1, 1, 2000.0, 10).unwrap();
//!
//! network.run(1000).unwrap();
//! assert!(network.spike_events().iter().any(|spike| spike.neuron_id == n0));
//! ```

pub mod core;
pub mod error;
pub mod simulator;
