//! Delayed-value buffer staging inputs until the step they are destined for.
use std::collections::VecDeque;

/// A buffer of values indexed by step offset, relative to the next step to be drained.
/// Values staged for the same step accumulate.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct RingBuffer {
    values: VecDeque<f64>,
}

impl RingBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        RingBuffer {
            values: VecDeque::new(),
        }
    }

    /// Add a value to the step `offset` steps after the next one to be drained.
    /// The buffer grows as needed.
    pub fn add_value(&mut self, offset: usize, value: f64) {
        if offset >= self.values.len() {
            self.values.resize(offset + 1, 0.0);
        }
        self.values[offset] += value;
    }

    /// Returns the value staged for the next step and move on to the following one.
    pub fn get_value(&mut self) -> f64 {
        self.values.pop_front().unwrap_or(0.0)
    }

    /// Returns the value staged `offset` steps ahead without draining it.
    pub fn peek(&self, offset: usize) -> f64 {
        self.values.get(offset).copied().unwrap_or(0.0)
    }

    /// Discard all staged values.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Returns the number of steps ahead for which values may be staged.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value is staged.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
