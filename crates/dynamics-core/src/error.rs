//! Error types for the control path
//!
//! Only lifecycle calls made from the control thread can fail. The audio path
//! recovers from numeric trouble locally and never returns an error.

use thiserror::Error;

/// Errors that can occur while configuring a compressor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DynamicsError {
    /// Sample rate was zero, negative, or not finite
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// Channel count outside the supported range
    #[error("Invalid channel count: {count} (supported 1..={max})")]
    InvalidChannelCount { count: usize, max: usize },
}

/// Result type for compressor control operations
pub type DynamicsResult<T> = Result<T, DynamicsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DynamicsError::InvalidSampleRate(-1.0);
        assert!(err.to_string().contains("-1"));

        let err = DynamicsError::InvalidChannelCount { count: 64, max: 32 };
        assert!(err.to_string().contains("64"));
        assert!(err.to_string().contains("32"));
    }
}
