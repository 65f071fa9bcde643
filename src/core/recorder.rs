//! Interfaces through which a neuron reports spikes and recordable quantities.
use serde::{Deserialize, Serialize};

use super::neuron::IafPscExpMultisynapse;
use crate::error::SNNError;

/// Receives a notification for every spike emitted during an update.
pub trait SpikeSink {
    /// Notify a spike emitted at the given lag within the updated step range.
    fn send(&mut self, lag: usize);
}

impl SpikeSink for Vec<usize> {
    fn send(&mut self, lag: usize) {
        self.push(lag);
    }
}

/// Receives the neuron at the end of every simulated step.
pub trait DataLogger {
    /// Record the state of the neuron at the given step.
    fn record(&mut self, step: u64, neuron: &IafPscExpMultisynapse);
}

/// A logger recording nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl DataLogger for NullLogger {
    fn record(&mut self, _step: u64, _neuron: &IafPscExpMultisynapse) {}
}

/// Reads a recordable quantity from a neuron.
pub type Accessor = fn(&IafPscExpMultisynapse) -> f64;

/// The recordable quantities of a neuron, by name.
pub const RECORDABLES: &[(&str, Accessor)] = &[
    ("V_m", IafPscExpMultisynapse::v_m),
    ("I_syn", IafPscExpMultisynapse::i_syn_sum),
];

/// Returns the accessor of the recordable with the given name.
pub fn recordable(name: &str) -> Result<Accessor, SNNError> {
    RECORDABLES
        .iter()
        .find(|(recordable_name, _)| *recordable_name == name)
        .map(|(_, accessor)| *accessor)
        .ok_or_else(|| SNNError::InvalidParameter(format!("Unknown recordable '{}'", name)))
}

/// A sample of recorded quantities at a given step.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub step: u64,
    pub values: Vec<f64>,
}

/// A data logger sampling a fixed selection of recordables every `interval` steps.
#[derive(Debug, Clone, Serialize)]
pub struct Multimeter {
    record_from: Vec<String>,
    interval: u64,
    #[serde(skip)]
    accessors: Vec<Accessor>,
    samples: Vec<Sample>,
}

impl Multimeter {
    /// Create a multimeter recording nothing.
    pub fn new() -> Self {
        Multimeter {
            record_from: vec![],
            interval: 1,
            accessors: vec![],
            samples: vec![],
        }
    }

    /// Create a multimeter recording the named quantities every `interval` steps.
    /// Returns an error for unknown names or a zero interval.
    pub fn build(record_from: &[&str], interval: u64) -> Result<Self, SNNError> {
        if interval == 0 {
            return Err(SNNError::InvalidParameter(
                "Recording interval must be at least one step".to_string(),
            ));
        }
        let accessors = record_from
            .iter()
            .map(|name| recordable(name))
            .collect::<Result<Vec<Accessor>, SNNError>>()?;

        Ok(Multimeter {
            record_from: record_from.iter().map(|name| name.to_string()).collect(),
            interval,
            accessors,
            samples: vec![],
        })
    }

    /// Returns the names of the recorded quantities.
    pub fn record_from(&self) -> &[String] {
        &self.record_from
    }

    /// Returns all samples recorded so far.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Returns the time series of the named quantity, if recorded.
    pub fn values(&self, name: &str) -> Option<Vec<f64>> {
        let pos = self.record_from.iter().position(|n| n == name)?;
        Some(self.samples.iter().map(|sample| sample.values[pos]).collect())
    }

    /// Discard all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for Multimeter {
    fn default() -> Self {
        Multimeter::new()
    }
}

impl DataLogger for Multimeter {
    fn record(&mut self, step: u64, neuron: &IafPscExpMultisynapse) {
        if self.accessors.is_empty() || step % self.interval != 0 {
            return;
        }
        let values = self.accessors.iter().map(|accessor| accessor(neuron)).collect();
        self.samples.push(Sample { step, values });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recordables() {
        let neuron = IafPscExpMultisynapse::new();
        assert_eq!(recordable("V_m").unwrap()(&neuron), -70.0);
        assert_eq!(recordable("I_syn").unwrap()(&neuron), 0.0);
        assert!(matches!(recordable("g_ex"), Err(SNNError::InvalidParameter(_))));
    }

    #[test]
    fn test_multimeter() {
        assert!(Multimeter::build(&["V_m", "w"], 1).is_err());
        assert!(Multimeter::build(&["V_m"], 0).is_err());

        let neuron = IafPscExpMultisynapse::new();
        let mut multimeter = Multimeter::build(&["I_syn", "V_m"], 2).unwrap();
        for step in 0..5 {
            multimeter.record(step, &neuron);
        }
        assert_eq!(multimeter.samples().len(), 3);
        assert_eq!(multimeter.samples()[1], Sample { step: 2, values: vec![0.0, -70.0] });
        assert_eq!(multimeter.values("V_m"), Some(vec![-70.0; 3]));
        assert_eq!(multimeter.values("w"), None);

        multimeter.clear();
        assert!(multimeter.samples().is_empty());
    }

    #[test]
    fn test_spike_sink() {
        let mut sink: Vec<usize> = vec![];
        sink.send(3);
        sink.send(7);
        assert_eq!(sink, vec![3, 7]);
    }
}
