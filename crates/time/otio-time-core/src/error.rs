//! Error types for time arithmetic and timecode conversion

use serde::{Deserialize, Serialize};

/// Failures raised by rate validation and timecode / time-string parsing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TimeError {
    /// Rescaling from or to a zero, negative or non-finite rate
    #[error("Invalid time rate: {rate}")]
    InvalidTimeRate { rate: f64 },

    /// Rate is not one of the broadcast timecode rates
    #[error("Invalid timecode rate: {rate}")]
    InvalidTimecodeRate { rate: f64 },

    /// Drop-frame form requested for a rate that has no drop-frame pattern
    #[error("Rate {rate} has no drop-frame timecode")]
    NonDropframeRate { rate: f64 },

    /// Timecode text is not `HH:MM:SS:FF` / `HH:MM:SS;FF`
    #[error("Invalid timecode string: '{input}'")]
    InvalidTimecodeString { input: String },

    /// Time text is not `HH:MM:SS[.frac]`
    #[error("Invalid time string: '{input}'")]
    InvalidTimeString { input: String },

    /// Frame field does not fit the nominal frame count of the rate
    #[error("Timecode '{timecode}' does not match rate {rate}")]
    TimecodeRateMismatch { timecode: String, rate: f64 },

    /// Timecode requested for a negative or non-finite time
    #[error("Value {value} cannot be expressed as timecode")]
    NegativeValue { value: f64 },
}

impl TimeError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidTimeRate { .. } => "computation",
            Self::InvalidTimecodeRate { .. }
            | Self::NonDropframeRate { .. }
            | Self::InvalidTimecodeString { .. }
            | Self::InvalidTimeString { .. }
            | Self::TimecodeRateMismatch { .. }
            | Self::NegativeValue { .. } => "parse",
        }
    }
}
