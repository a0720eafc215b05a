//! FIR coefficient design
//!
//! Pure functions computing windowed-sinc tap vectors for lowpass,
//! highpass, bandpass, bandstop, and Kaiser-windowed bandpass filters.
//! Same inputs always produce bit-identical outputs; no randomness is
//! involved. The resulting tap vectors feed [`crate::filters::FirFilter`].
//!
//! ## Design Methods
//!
//! - `lowpass`/`highpass`: Hamming-windowed sinc, spectral inversion
//! - `bandstop`/`bandpass`: superposition of lowpass designs
//! - `kaiser_bandpass`: Kaiser-tapered ideal-band Fourier series with
//!   attenuation-derived β
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::filters::fir_design;
//!
//! let taps = fir_design::lowpass(1000.0, 100.0, 32);
//! assert_eq!(taps.len(), 33);
//! let dc: f64 = taps.iter().sum();
//! assert!((dc - 1.0).abs() < 1e-9);
//! ```

use super::windows::{bessel_i0, hamming_window, kaiser_beta_from_attenuation};
use std::f64::consts::PI;

/// Design a lowpass filter: Hamming-windowed sinc, DC-normalized.
///
/// Produces `order + 1` taps. The center tap uses the sinc limit
/// ω = 2πFc/Fs directly to avoid the 0/0 form.
pub fn lowpass(fs: f64, fc: f64, order: usize) -> Vec<f64> {
    let num_taps = order + 1;
    let omega = 2.0 * PI * fc / fs;
    let mid = order as f64 / 2.0;
    let window = hamming_window(num_taps);

    let mut taps: Vec<f64> = (0..num_taps)
        .map(|i| {
            let n = i as f64 - mid;
            let sinc = if n.abs() < 1e-12 {
                omega
            } else {
                (omega * n).sin() / n
            };
            sinc * window[i]
        })
        .collect();

    // Normalize to unity gain at DC.
    let sum: f64 = taps.iter().sum();
    if sum.abs() > 1e-12 {
        for t in taps.iter_mut() {
            *t /= sum;
        }
    }
    taps
}

/// Design a highpass filter by spectral inversion of a lowpass.
///
/// Negates every tap and adds one to the center tap.
pub fn highpass(fs: f64, fc: f64, order: usize) -> Vec<f64> {
    spectral_invert(lowpass(fs, fc, order))
}

/// Design a bandstop filter from the superposition of a lowpass at the
/// lower edge and a highpass at the upper edge.
///
/// `f1 < f2`; the stop band lies between them.
pub fn bandstop(fs: f64, order: usize, f1: f64, f2: f64) -> Vec<f64> {
    let lp = lowpass(fs, f1, order);
    let hp = spectral_invert(lowpass(fs, f2, order));
    lp.iter().zip(hp.iter()).map(|(l, h)| l + h).collect()
}

/// Design a bandpass filter as the spectral inversion of a bandstop.
pub fn bandpass(fs: f64, order: usize, f1: f64, f2: f64) -> Vec<f64> {
    spectral_invert(bandstop(fs, order, f1, f2))
}

/// Design a Kaiser-windowed bandpass filter.
///
/// `order` is forced odd (incremented when even). The impulse response is
/// built from the ideal band's Fourier series coefficients tapered by
/// `I0(β·sqrt(1 − (n/Np)²)) / I0(β)`, where β derives from the requested
/// stopband attenuation. The result is symmetric around its center.
pub fn kaiser_bandpass(fs: f64, fa: f64, fb: f64, order: usize, attenuation_db: f64) -> Vec<f64> {
    let order = if order % 2 == 0 { order + 1 } else { order };
    let np = (order - 1) / 2;
    if np == 0 {
        return vec![2.0 * (fb - fa) / fs];
    }
    let beta = kaiser_beta_from_attenuation(attenuation_db);
    let i0_beta = bessel_i0(beta);

    // Fourier series coefficients of the ideal band [fa, fb].
    let mut ideal = vec![0.0; np + 1];
    ideal[0] = 2.0 * (fb - fa) / fs;
    for j in 1..=np {
        let x = j as f64;
        ideal[j] = ((2.0 * PI * x * fb / fs).sin() - (2.0 * PI * x * fa / fs).sin()) / (PI * x);
    }

    let mut taps = vec![0.0; order];
    for j in -(np as isize)..=(np as isize) {
        let x = j as f64 / np as f64;
        let taper = bessel_i0(beta * (1.0 - x * x).sqrt()) / i0_beta;
        taps[(np as isize + j) as usize] = ideal[j.unsigned_abs()] * taper;
    }
    taps
}

/// Negate all taps and add one to the center tap.
fn spectral_invert(mut taps: Vec<f64>) -> Vec<f64> {
    let center = taps.len() / 2;
    for t in taps.iter_mut() {
        *t = -*t;
    }
    taps[center] += 1.0;
    taps
}
