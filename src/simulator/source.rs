//! External stimulation devices.
use derivative::Derivative;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use crate::error::SNNError;

/// A generator of Poisson spike trains on one receptor of a neuron.
///
/// At every step, the number of spikes is drawn from a Poisson distribution of mean
/// `rate * h`, and their summed weight is delivered as a single event.
#[derive(Derivative, Clone)]
#[derivative(Debug, PartialEq)]
pub struct PoissonInput {
    target_id: usize,
    receptor: usize,
    /// Firing rate (Hz).
    rate: f64,
    /// Weight of each spike (pA).
    weight: f64,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    distribution: Option<Poisson<f64>>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    rng: ChaCha8Rng,
}

impl PoissonInput {
    /// Create a Poisson input with the given rate (Hz) and weight (pA), seeded for reproducibility.
    pub fn build(
        target_id: usize,
        receptor: usize,
        rate: f64,
        weight: f64,
        seed: u64,
    ) -> Result<Self, SNNError> {
        if !(rate >= 0.0 && rate.is_finite()) {
            return Err(SNNError::InvalidParameter(
                "Poisson rate must be finite and non-negative".to_string(),
            ));
        }
        if !weight.is_finite() {
            return Err(SNNError::InvalidParameter(
                "Poisson weight must be finite".to_string(),
            ));
        }
        Ok(PoissonInput {
            target_id,
            receptor,
            rate,
            weight,
            distribution: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Set up the spike count distribution for the time step `h` (ms).
    pub fn calibrate(&mut self, h: f64) -> Result<(), SNNError> {
        let mean = self.rate * h * 1e-3;
        self.distribution = match mean > 0.0 {
            true => Some(Poisson::new(mean).map_err(|e| {
                SNNError::InvalidParameter(format!("Invalid Poisson distribution: {}", e))
            })?),
            false => None,
        };
        Ok(())
    }

    /// Draw the number of spikes emitted during the next step.
    pub fn sample(&mut self) -> u64 {
        match &self.distribution {
            Some(distribution) => distribution.sample(&mut self.rng) as u64,
            None => 0,
        }
    }

    /// Returns the ID of the stimulated neuron.
    pub fn target_id(&self) -> usize {
        self.target_id
    }

    /// Returns the receptor port on the stimulated neuron.
    pub fn receptor(&self) -> usize {
        self.receptor
    }

    /// Returns the firing rate (Hz).
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the weight of each spike (pA).
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A constant current injected into a neuron.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DcInput {
    pub target_id: usize,
    /// Amplitude of the current (pA).
    pub amplitude: f64,
}

impl DcInput {
    pub fn build(target_id: usize, amplitude: f64) -> Result<Self, SNNError> {
        if !amplitude.is_finite() {
            return Err(SNNError::InvalidParameter(
                "Current amplitude must be finite".to_string(),
            ));
        }
        Ok(DcInput {
            target_id,
            amplitude,
        })
    }
}
