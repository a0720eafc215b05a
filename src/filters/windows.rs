//! Window functions for FIR filter design
//!
//! Provides the Hamming window used by the windowed-sinc designers and the
//! Kaiser window machinery used by the bandpass designer and the polyphase
//! resampler prototype.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::filters::windows::{hamming_window, kaiser_beta_from_attenuation};
//!
//! let w = hamming_window(33);
//! assert_eq!(w.len(), 33);
//!
//! let beta = kaiser_beta_from_attenuation(100.0);
//! assert!(beta > 9.0);
//! ```

use std::f64::consts::PI;

/// Generate a Hamming window.
///
/// w[n] = 0.54 - 0.46 * cos(2πn/(N-1))
pub fn hamming_window(length: usize) -> Vec<f64> {
    if length == 0 {
        return vec![];
    }
    if length == 1 {
        return vec![1.0];
    }

    let n_minus_1 = (length - 1) as f64;
    (0..length)
        .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / n_minus_1).cos())
        .collect()
}

/// Generate a Kaiser window with shape parameter β.
pub fn kaiser_window(length: usize, beta: f64) -> Vec<f64> {
    if length == 0 {
        return vec![];
    }
    if length == 1 {
        return vec![1.0];
    }

    let half = (length - 1) as f64 / 2.0;
    let i0_beta = bessel_i0(beta);

    (0..length)
        .map(|n| {
            let x = (n as f64 - half) / half;
            bessel_i0(beta * (1.0 - x * x).sqrt()) / i0_beta
        })
        .collect()
}

/// Kaiser β from desired stopband attenuation in dB.
///
/// Standard empirical piecewise formula: zero below 21 dB, polynomial
/// blend between 21 and 50 dB, linear above.
pub fn kaiser_beta_from_attenuation(attenuation_db: f64) -> f64 {
    if attenuation_db > 50.0 {
        0.1102 * (attenuation_db - 8.7)
    } else if attenuation_db >= 21.0 {
        0.5842 * (attenuation_db - 21.0).powf(0.4) + 0.07886 * (attenuation_db - 21.0)
    } else {
        0.0
    }
}

/// Modified Bessel function of the first kind, order 0.
///
/// Evaluated via the standard finite series, iterating until the next
/// term contributes less than 1e-6 relative to the running sum.
pub fn bessel_i0(x: f64) -> f64 {
    let mut d = 0.0;
    let mut ds = 1.0;
    let mut s = 1.0;
    loop {
        d += 2.0;
        ds *= (x * x) / (d * d);
        s += ds;
        if ds <= s * 1e-6 {
            break;
        }
    }
    s
}
