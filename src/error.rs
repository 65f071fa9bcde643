//! Error module for the Rusty IAF library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq, Clone)]
pub enum SNNError {
    /// Error for invalid parameters, e.g., non-positive capacitance or reset above threshold.
    InvalidParameter(String),
    /// Error for invalid channel, e.g., a receptor port outside of the current channel count.
    InvalidChannel(String),
    /// Error for out of bounds access, e.g., neuron not found.
    OutOfBounds(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for SNNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SNNError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            SNNError::InvalidChannel(e) => write!(f, "Invalid channel: {}", e),
            SNNError::OutOfBounds(e) => write!(f, "Index out of bounds: {}", e),
            SNNError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for SNNError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SNNError::InvalidParameter("Capacitance must be > 0.".to_string()).to_string(),
            "Invalid parameters: Capacitance must be > 0."
        );
        assert_eq!(
            SNNError::InvalidChannel("port 3".to_string()).to_string(),
            "Invalid channel: port 3"
        );
    }
}
