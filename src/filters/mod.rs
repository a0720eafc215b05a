//! Digital filtering: coefficient design and streaming engines
//!
//! - [`windows`]: window functions for FIR design (Hamming, Kaiser)
//! - [`fir_design`]: windowed-sinc FIR coefficient calculators
//! - [`biquad`]: single-stage IIR coefficient design
//! - [`cascade`]: higher-order IIR design from prototype pole tables
//! - [`fir`] / [`iir`]: stateful streaming engines over the designed
//!   coefficients
//!
//! Design is pure and engines are stateful, so one coefficient set can
//! feed many concurrent channels.

pub mod biquad;
pub mod cascade;
pub mod fir;
pub mod fir_design;
pub mod iir;
pub mod windows;

pub use biquad::BiquadCoeffs;
pub use cascade::{calc_cascade, CascadeParams, Characteristic, FilterBehavior, Transform};
pub use fir::FirFilter;
pub use iir::{IirFilter, StagePolesZeros};

use crate::types::complex_ops;
use num_complex::Complex64;
use std::f64::consts::PI;

/// One point of a frequency response sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyPoint {
    /// Linear magnitude.
    pub magnitude: f64,
    /// Phase in radians.
    pub phase: f64,
    /// Magnitude in dB (-inf at zero magnitude).
    pub magnitude_db: f64,
}

impl FrequencyPoint {
    pub fn from_complex(h: Complex64) -> Self {
        Self {
            magnitude: complex_ops::magnitude(h),
            phase: complex_ops::phase(h),
            magnitude_db: complex_ops::magnitude_db(h),
        }
    }
}

/// Evaluate an FIR tap vector at z = e^(j·2π·f), with f the frequency
/// as a fraction of the sample rate.
pub(crate) fn evaluate_taps(taps: &[f64], frequency_fraction: f64) -> Complex64 {
    let theta = -2.0 * PI * frequency_fraction;
    taps.iter()
        .enumerate()
        .map(|(j, &t)| t * Complex64::from_polar(1.0, theta * j as f64))
        .sum()
}

/// Unwrap the phase across a response sweep so adjacent points never
/// differ by more than pi.
pub(crate) fn unwrap_phases(points: &mut [FrequencyPoint]) {
    let mut offset = 0.0;
    for i in 1..points.len() {
        let raw = points[i].phase;
        let prev = points[i - 1].phase;
        let mut unwrapped = raw + offset;
        while unwrapped - prev > PI {
            unwrapped -= 2.0 * PI;
            offset -= 2.0 * PI;
        }
        while unwrapped - prev < -PI {
            unwrapped += 2.0 * PI;
            offset += 2.0 * PI;
        }
        points[i].phase = unwrapped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_evaluate_taps_dc_is_sum() {
        let h = evaluate_taps(&[0.25, 0.5, 0.25], 0.0);
        assert_relative_eq!(h.re, 1.0, epsilon = 1e-15);
        assert_relative_eq!(h.im, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_unwrap_removes_two_pi_jumps() {
        let mut pts = vec![
            FrequencyPoint {
                magnitude: 1.0,
                phase: -3.0,
                magnitude_db: 0.0,
            },
            FrequencyPoint {
                magnitude: 1.0,
                phase: 3.0,
                magnitude_db: 0.0,
            },
        ];
        unwrap_phases(&mut pts);
        assert_relative_eq!(pts[1].phase, 3.0 - 2.0 * PI, epsilon = 1e-12);
    }
}
