//! Module implementing the concept of connections in a network.
use serde::{Deserialize, Serialize};

use crate::error::SNNError;

/// A connection between two neurons.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// The ID of the neuron producing spikes.
    pub source_id: usize,
    /// The ID of the neuron receiving spikes.
    pub target_id: usize,
    /// The receptor port (1-based) on the target neuron.
    pub receptor: usize,
    /// The weight of the synapse along which the spikes are transmitted (pA).
    pub weight: f64,
    /// The delay of the synapse along which the spikes are transmitted (steps).
    pub delay: usize,
}

impl Connection {
    /// Create a new connection with the specified parameters.
    /// Returns an error if the delay is shorter than one step or the receptor is zero.
    pub fn build(
        source_id: usize,
        target_id: usize,
        receptor: usize,
        weight: f64,
        delay: usize,
    ) -> Result<Self, SNNError> {
        if delay == 0 {
            return Err(SNNError::InvalidParameter(
                "Connection delay must be at least one step".to_string(),
            ));
        }
        if receptor == 0 {
            return Err(SNNError::InvalidChannel(
                "Receptor ports start at 1".to_string(),
            ));
        }
        if !weight.is_finite() {
            return Err(SNNError::InvalidParameter(
                "Connection weight must be finite".to_string(),
            ));
        }

        Ok(Connection {
            source_id,
            target_id,
            receptor,
            weight,
            delay,
        })
    }
}
