//! Spike-time bookkeeping of a neuron.
use serde::{Deserialize, Serialize};

/// The (sorted) steps at which a neuron emitted spikes.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct SpikeHistory {
    steps: Vec<u64>,
}

impl SpikeHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        SpikeHistory { steps: vec![] }
    }

    /// Record a spike at the given step.
    /// Steps are expected in non-decreasing order, as produced by the update loop.
    pub fn record(&mut self, step: u64) {
        debug_assert!(
            self.steps.last().map_or(true, |&last| last <= step),
            "spike steps must be recorded in order"
        );
        self.steps.push(step);
    }

    /// Returns the step of the last spike, if any.
    pub fn last_spike(&self) -> Option<u64> {
        self.steps.last().copied()
    }

    /// Returns a slice of all spike steps.
    pub fn steps(&self) -> &[u64] {
        &self.steps[..]
    }

    /// Returns the spike times (ms) for the given resolution.
    pub fn times(&self, h: f64) -> Vec<f64> {
        self.steps.iter().map(|&step| step as f64 * h).collect()
    }

    /// Returns the number of recorded spikes.
    pub fn num_spikes(&self) -> usize {
        self.steps.len()
    }

    /// Clear all recorded spikes.
    pub fn clear(&mut self) {
        self.steps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_history() {
        let mut history = SpikeHistory::new();
        assert_eq!(history.last_spike(), None);

        history.record(3);
        history.record(42);
        assert_eq!(history.steps(), &[3, 42]);
        assert_eq!(history.last_spike(), Some(42));
        assert_eq!(history.num_spikes(), 2);
        assert_eq!(history.times(0.5), vec![1.5, 21.0]);

        history.clear();
        assert_eq!(history.num_spikes(), 0);
    }
}
