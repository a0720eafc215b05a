//! Core types for physiological signal processing
//!
//! This module defines the fundamental types used throughout the crate:
//! timestamped samples, time-value series, and the error taxonomy shared
//! by the filter designers, statistics, and buffering primitives.
//!
//! ## Timestamps
//!
//! Timestamps are epoch milliseconds stored as `f64`. Within one channel
//! they are non-decreasing; algorithms may rely on that ordering but must
//! tolerate duplicate timestamps (a zero-duration series is a valid input
//! to the resamplers).

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Type alias for complex numbers using f64 precision.
///
/// Used by the filter frequency-response evaluation.
pub type Complex = Complex64;

/// A single timestamped sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Epoch milliseconds.
    pub timestamp: f64,
    /// Sample value in channel units.
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// An ordered time-value series.
///
/// Semantically interchangeable with parallel `(timestamps, values)`
/// arrays; the resampling algorithms accept either representation and
/// produce identical numeric output for both.
pub type Series = Vec<Sample>;

/// Split a series into parallel timestamp/value arrays.
pub fn to_parallel(series: &[Sample]) -> (Vec<f64>, Vec<f64>) {
    let timestamps = series.iter().map(|s| s.timestamp).collect();
    let values = series.iter().map(|s| s.value).collect();
    (timestamps, values)
}

/// Combine parallel timestamp/value arrays into a series.
///
/// The arrays must have equal length.
pub fn from_parallel(timestamps: &[f64], values: &[f64]) -> Series {
    assert_eq!(
        timestamps.len(),
        values.len(),
        "parallel arrays must have equal length"
    );
    timestamps
        .iter()
        .zip(values.iter())
        .map(|(&t, &v)| Sample::new(t, v))
        .collect()
}

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;

/// Errors raised by configuration mistakes.
///
/// These indicate caller-logic bugs and are never caught internally.
/// Numerical degeneracies (NaN, ±Inf, −∞ dB at zero magnitude) are *not*
/// errors; they propagate as sentinel values and callers check for
/// finiteness where it matters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DspError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("unknown filter behavior: {0}")]
    UnknownBehavior(String),

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("invalid capacity: {0} (must be a positive integer)")]
    InvalidCapacity(usize),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid sample rate: {0} (must be finite and positive)")]
    InvalidRate(f64),

    #[error("filter design failed: {0}")]
    DesignFailed(&'static str),
}

/// Helper functions for working with complex values.
pub mod complex_ops {
    use super::*;

    /// Create a complex number from magnitude and phase.
    #[inline]
    pub fn from_polar(magnitude: f64, phase: f64) -> Complex {
        Complex::new(magnitude * phase.cos(), magnitude * phase.sin())
    }

    /// Magnitude of a complex number (hypot of the components).
    #[inline]
    pub fn magnitude(c: Complex) -> f64 {
        c.norm()
    }

    /// Phase (argument) of a complex number in radians.
    #[inline]
    pub fn phase(c: Complex) -> f64 {
        c.im.atan2(c.re)
    }

    /// Magnitude in decibels. Returns −∞ at zero magnitude.
    #[inline]
    pub fn magnitude_db(c: Complex) -> f64 {
        20.0 * c.norm().log10()
    }
}
