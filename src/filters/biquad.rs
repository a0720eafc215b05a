//! Biquad (second-order section) coefficient design
//!
//! Pure functions computing normalized biquad coefficients from the
//! Audio-EQ-Cookbook formulas, plus the matched-Z and Bessel-Thomson
//! closed forms. Coefficients are immutable value objects; the streaming
//! state lives in [`crate::filters::IirFilter`].
//!
//! All designers fail fast (`DspError::MissingParameter`) when a required
//! parameter is absent. Out-of-range configuration (Fc beyond Nyquist and
//! the like) is deliberately unchecked; it produces numerically bad
//! coefficients rather than an error.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::filters::biquad::{self, IirParams};
//!
//! let coeffs = biquad::lowpass(&IirParams {
//!     fs: 48000.0,
//!     fc: 1000.0,
//!     q: Some(std::f64::consts::FRAC_1_SQRT_2),
//!     ..Default::default()
//! })
//! .unwrap();
//! assert!(coeffs.is_stable());
//! ```

use crate::types::{DspError, DspResult};
use std::f64::consts::{LN_2, PI};

/// Normalized biquad coefficients.
///
/// Transfer function: H(z) = k · (b0 + b1·z⁻¹ + b2·z⁻²) / (1 + a1·z⁻¹ + a2·z⁻²)
///
/// `b` and `a` are already divided by a0; `k` carries a separate output
/// gain for the pre-gain designs (1.0 otherwise).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    /// Feedforward coefficients [b0, b1, b2].
    pub b: [f64; 3],
    /// Feedback coefficients [a1, a2] (a0 normalized to 1).
    pub a: [f64; 2],
    /// Separate output gain.
    pub k: f64,
}

impl BiquadCoeffs {
    /// Check stability: both poles strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        self.a[1].abs() < 1.0 && self.a[0].abs() < 1.0 + self.a[1]
    }
}

/// Design parameters shared by the single-stage designers.
#[derive(Debug, Clone, Copy)]
pub struct IirParams {
    /// Sample rate in Hz.
    pub fs: f64,
    /// Corner/center frequency in Hz.
    pub fc: f64,
    /// Quality factor. Either `q` or `bw` must be given.
    pub q: Option<f64>,
    /// Bandwidth in octaves, alternative to `q`.
    pub bw: Option<f64>,
    /// Gain in dB, used by peak and shelf designs.
    pub gain: f64,
    /// Fold DC/Nyquist gain into `k` instead of `b`.
    pub pre_gain: bool,
}

impl Default for IirParams {
    fn default() -> Self {
        Self {
            fs: 1.0,
            fc: 0.25,
            q: None,
            bw: None,
            gain: 0.0,
            pre_gain: false,
        }
    }
}

/// Shared precomputation results.
struct PreCalc {
    alpha: f64,
    cw: f64,
    a0: f64,
    a: [f64; 2],
}

/// Shared precomputation: requires either Q or BW (bandwidth in octaves).
fn pre_calc(p: &IirParams) -> DspResult<PreCalc> {
    let w = 2.0 * PI * p.fc / p.fs;
    let alpha = if let Some(bw) = p.bw {
        w.sin() * ((LN_2 / 2.0) * bw * w / w.sin()).sinh()
    } else if let Some(q) = p.q {
        w.sin() / (2.0 * q)
    } else {
        return Err(DspError::MissingParameter("Q or BW"));
    };
    let cw = w.cos();
    let a0 = 1.0 + alpha;
    Ok(PreCalc {
        alpha,
        cw,
        a0,
        a: [-2.0 * cw / a0, (1.0 - alpha) / a0],
    })
}

/// Gain precomputation for peak and shelf designs: requires Q
/// specifically, and derives A = 10^(gain/40).
fn pre_calc_gain(p: &IirParams) -> DspResult<(f64, f64, f64)> {
    let q = p.q.ok_or(DspError::MissingParameter("Q"))?;
    let w = 2.0 * PI * p.fc / p.fs;
    let alpha = w.sin() / (2.0 * q);
    let big_a = 10f64.powf(p.gain / 40.0);
    Ok((w.cos(), alpha, big_a))
}

/// Cookbook lowpass.
pub fn lowpass(p: &IirParams) -> DspResult<BiquadCoeffs> {
    let pre = pre_calc(p)?;
    let (b, k) = if p.pre_gain {
        (
            [1.0 / pre.a0, 2.0 / pre.a0, 1.0 / pre.a0],
            (1.0 - pre.cw) * 0.5,
        )
    } else {
        let b0 = (1.0 - pre.cw) / (2.0 * pre.a0);
        ([b0, (1.0 - pre.cw) / pre.a0, b0], 1.0)
    };
    Ok(BiquadCoeffs { b, a: pre.a, k })
}

/// Cookbook highpass.
pub fn highpass(p: &IirParams) -> DspResult<BiquadCoeffs> {
    let pre = pre_calc(p)?;
    let (b, k) = if p.pre_gain {
        (
            [1.0 / pre.a0, -2.0 / pre.a0, 1.0 / pre.a0],
            (1.0 + pre.cw) * 0.5,
        )
    } else {
        let b0 = (1.0 + pre.cw) / (2.0 * pre.a0);
        ([b0, -(1.0 + pre.cw) / pre.a0, b0], 1.0)
    };
    Ok(BiquadCoeffs { b, a: pre.a, k })
}

/// Allpass: the numerator mirrors the denominator, so the magnitude
/// response is unity at every frequency by construction.
pub fn allpass(p: &IirParams) -> DspResult<BiquadCoeffs> {
    let pre = pre_calc(p)?;
    Ok(BiquadCoeffs {
        b: [
            (1.0 - pre.alpha) / pre.a0,
            -2.0 * pre.cw / pre.a0,
            (1.0 + pre.alpha) / pre.a0,
        ],
        a: pre.a,
        k: 1.0,
    })
}

/// Bandpass with constant skirt gain (peak gain Q). Requires Q.
pub fn bandpass_q(p: &IirParams) -> DspResult<BiquadCoeffs> {
    let q = p.q.ok_or(DspError::MissingParameter("Q"))?;
    let pre = pre_calc(p)?;
    let b0 = pre.alpha * q / pre.a0;
    Ok(BiquadCoeffs {
        b: [b0, 0.0, -b0],
        a: pre.a,
        k: 1.0,
    })
}

/// Bandpass with 0 dB peak gain. Accepts Q or BW.
pub fn bandpass(p: &IirParams) -> DspResult<BiquadCoeffs> {
    let pre = pre_calc(p)?;
    let b0 = pre.alpha / pre.a0;
    Ok(BiquadCoeffs {
        b: [b0, 0.0, -b0],
        a: pre.a,
        k: 1.0,
    })
}

/// Bandstop (notch).
pub fn bandstop(p: &IirParams) -> DspResult<BiquadCoeffs> {
    let pre = pre_calc(p)?;
    Ok(BiquadCoeffs {
        b: [1.0 / pre.a0, -2.0 * pre.cw / pre.a0, 1.0 / pre.a0],
        a: pre.a,
        k: 1.0,
    })
}

/// Peaking EQ. Requires Q; gain in dB.
pub fn peak(p: &IirParams) -> DspResult<BiquadCoeffs> {
    let (cw, alpha, big_a) = pre_calc_gain(p)?;
    let a0 = 1.0 + alpha / big_a;
    Ok(BiquadCoeffs {
        b: [
            (1.0 + alpha * big_a) / a0,
            -2.0 * cw / a0,
            (1.0 - alpha * big_a) / a0,
        ],
        a: [-2.0 * cw / a0, (1.0 - alpha / big_a) / a0],
        k: 1.0,
    })
}

/// Low shelf. Requires Q; gain in dB.
pub fn lowshelf(p: &IirParams) -> DspResult<BiquadCoeffs> {
    let (cw, alpha, big_a) = pre_calc_gain(p)?;
    let sa = 2.0 * big_a.sqrt() * alpha;
    let a0 = (big_a + 1.0) + (big_a - 1.0) * cw + sa;
    Ok(BiquadCoeffs {
        b: [
            big_a * ((big_a + 1.0) - (big_a - 1.0) * cw + sa) / a0,
            2.0 * big_a * ((big_a - 1.0) - (big_a + 1.0) * cw) / a0,
            big_a * ((big_a + 1.0) - (big_a - 1.0) * cw - sa) / a0,
        ],
        a: [
            -2.0 * ((big_a - 1.0) + (big_a + 1.0) * cw) / a0,
            ((big_a + 1.0) + (big_a - 1.0) * cw - sa) / a0,
        ],
        k: 1.0,
    })
}

/// High shelf. Requires Q; gain in dB.
pub fn highshelf(p: &IirParams) -> DspResult<BiquadCoeffs> {
    let (cw, alpha, big_a) = pre_calc_gain(p)?;
    let sa = 2.0 * big_a.sqrt() * alpha;
    let a0 = (big_a + 1.0) - (big_a - 1.0) * cw + sa;
    Ok(BiquadCoeffs {
        b: [
            big_a * ((big_a + 1.0) + (big_a - 1.0) * cw + sa) / a0,
            -2.0 * big_a * ((big_a - 1.0) + (big_a + 1.0) * cw) / a0,
            big_a * ((big_a + 1.0) + (big_a - 1.0) * cw - sa) / a0,
        ],
        a: [
            2.0 * ((big_a - 1.0) - (big_a + 1.0) * cw) / a0,
            ((big_a + 1.0) - (big_a - 1.0) * cw - sa) / a0,
        ],
        k: 1.0,
    })
}

/// Matched-Z transform lowpass from analog coefficients `a_s`, `b_s`
/// (analog prototype 1/(b_s·s² + a_s·s + 1)).
///
/// Fails when either coefficient is zero. A negative discriminant (the
/// complex-conjugate-pole case) is folded through `sqrt(abs(...))` into a
/// real-valued oscillatory term; the mode switch is silent.
pub fn lowpass_mz(fs: f64, fc: f64, a_s: f64, b_s: f64, pre_gain: bool) -> DspResult<BiquadCoeffs> {
    if a_s == 0.0 {
        return Err(DspError::MissingParameter("as"));
    }
    if b_s == 0.0 {
        return Err(DspError::MissingParameter("bs"));
    }
    let w = 2.0 * PI * fc / fs;
    let s = -a_s / (2.0 * b_s);
    let wd = (a_s * a_s / (4.0 * b_s * b_s) - 1.0 / b_s).abs().sqrt();
    let a1 = -2.0 * (s * w).exp() * (wd * w).cos();
    let a2 = (2.0 * s * w).exp();

    let dc = 1.0 + a1 + a2;
    let (b, k) = if pre_gain {
        ([1.0, 0.0, 0.0], dc)
    } else {
        ([dc, 0.0, 0.0], 1.0)
    };
    Ok(BiquadCoeffs { b, a: [a1, a2], k })
}

/// Second-order Bessel-Thomson lowpass (fixed Q = 1).
///
/// Bilinear transform of the normalized Bessel prototype 3/(s² + 3s + 3)
/// with pre-warped corner wp = tan(πFc/Fs).
pub fn lowpass_bt(fs: f64, fc: f64) -> BiquadCoeffs {
    let wp = (PI * fc / fs).tan();
    let wp2 = wp * wp;
    let a0 = 1.0 + 3.0 * wp + 3.0 * wp2;
    let b0 = 3.0 * wp2 / a0;
    BiquadCoeffs {
        b: [b0, 2.0 * b0, b0],
        a: [(6.0 * wp2 - 2.0) / a0, (1.0 - 3.0 * wp + 3.0 * wp2) / a0],
        k: 1.0,
    }
}

/// Second-order Bessel-Thomson highpass (fixed Q = 1).
pub fn highpass_bt(fs: f64, fc: f64) -> BiquadCoeffs {
    let wp = (PI * fc / fs).tan();
    let wp2 = wp * wp;
    let a0 = 3.0 + 3.0 * wp + wp2;
    let b0 = 3.0 / a0;
    BiquadCoeffs {
        b: [b0, -2.0 * b0, b0],
        a: [(2.0 * wp2 - 6.0) / a0, (3.0 - 3.0 * wp + wp2) / a0],
        k: 1.0,
    }
}

/// First-order Butterworth highpass as a degenerate biquad (b2 = a2 = 0).
///
/// Used by the movement-magnitude derivation to strip the gravity DC
/// component from accelerometer axes.
pub fn highpass_first_order(fs: f64, fc: f64) -> BiquadCoeffs {
    let wp = (PI * fc / fs).tan();
    let a0 = 1.0 + wp;
    BiquadCoeffs {
        b: [1.0 / a0, -1.0 / a0, 0.0],
        a: [(wp - 1.0) / a0, 0.0],
        k: 1.0,
    }
}
