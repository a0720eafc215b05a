//! Higher-order IIR design as a cascade of biquad stages
//!
//! Steep filters are built by chaining second-order sections, each with
//! its own quality factor and corner-frequency scale derived from the
//! analog prototype poles of the selected characteristic (Butterworth,
//! Bessel, or Chebyshev). Butterworth stage Qs come from the closed-form
//! pole angles; Bessel and Chebyshev stages are derived from the
//! prototype pole sets, normalized numerically to the -3 dB (or -1 dB)
//! cutoff.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::filters::cascade::{calc_cascade, CascadeParams, Characteristic, FilterBehavior};
//!
//! let stages = calc_cascade(&CascadeParams {
//!     behavior: FilterBehavior::Lowpass,
//!     characteristic: Characteristic::Butterworth,
//!     fs: 250.0,
//!     fc: 30.0,
//!     order: 3,
//!     ..Default::default()
//! })
//! .unwrap();
//! assert_eq!(stages.len(), 3);
//! ```

use crate::filters::biquad::{self, BiquadCoeffs, IirParams};
use crate::types::{DspError, DspResult};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Hard ceiling on the number of cascaded biquad stages.
pub const MAX_CASCADE_STAGES: usize = 12;

/// Frequency response shape of each stage in a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterBehavior {
    Lowpass,
    Highpass,
    /// 0 dB peak-gain bandpass.
    Bandpass,
    /// Constant-skirt-gain bandpass (peak gain Q).
    BandpassQ,
    Bandstop,
    Allpass,
    Peak,
    Lowshelf,
    Highshelf,
    /// Second-order Bessel-Thomson lowpass (fixed Q = 1).
    LowpassBt,
    /// Second-order Bessel-Thomson highpass (fixed Q = 1).
    HighpassBt,
}

impl FromStr for FilterBehavior {
    type Err = DspError;

    fn from_str(s: &str) -> DspResult<Self> {
        match s {
            "lowpass" => Ok(Self::Lowpass),
            "highpass" => Ok(Self::Highpass),
            "bandpass" => Ok(Self::Bandpass),
            "bandpassQ" => Ok(Self::BandpassQ),
            "bandstop" => Ok(Self::Bandstop),
            "allpass" => Ok(Self::Allpass),
            "peak" => Ok(Self::Peak),
            "lowshelf" => Ok(Self::Lowshelf),
            "highshelf" => Ok(Self::Highshelf),
            "lowpassBT" => Ok(Self::LowpassBt),
            "highpassBT" => Ok(Self::HighpassBt),
            other => Err(DspError::UnknownBehavior(other.to_string())),
        }
    }
}

/// Analog prototype family for the cascade stage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Characteristic {
    Butterworth,
    Bessel,
    /// Chebyshev type I with 0.5 dB passband ripple.
    Chebyshev05,
    /// Chebyshev type I with 1 dB passband ripple.
    Chebyshev1,
    /// Chebyshev type I with 2 dB passband ripple.
    Chebyshev2,
    /// Chebyshev type I with 3 dB passband ripple.
    Chebyshev3,
}

impl Characteristic {
    fn ripple_db(self) -> Option<f64> {
        match self {
            Self::Chebyshev05 => Some(0.5),
            Self::Chebyshev1 => Some(1.0),
            Self::Chebyshev2 => Some(2.0),
            Self::Chebyshev3 => Some(3.0),
            _ => None,
        }
    }
}

/// s-plane to z-plane mapping used by a cascade design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Transform {
    /// Bilinear transform via the cookbook biquad formulas.
    #[default]
    Bilinear,
    /// Matched-Z transform of the Bessel prototype (lowpass only).
    MatchedZ,
}

/// Parameters for [`calc_cascade`].
#[derive(Debug, Clone, Copy)]
pub struct CascadeParams {
    pub behavior: FilterBehavior,
    pub characteristic: Characteristic,
    pub transform: Transform,
    /// Sample rate in Hz.
    pub fs: f64,
    /// Corner/center frequency in Hz.
    pub fc: f64,
    /// Number of biquad stages (clamped to [`MAX_CASCADE_STAGES`]).
    pub order: usize,
    /// Gain in dB for peak/shelf behaviors.
    pub gain: f64,
    /// Fold per-stage gain into `k` instead of `b`.
    pub pre_gain: bool,
    /// Normalize the prototype to the -1 dB point instead of -3 dB.
    pub one_db: bool,
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self {
            behavior: FilterBehavior::Lowpass,
            characteristic: Characteristic::Butterworth,
            transform: Transform::Bilinear,
            fs: 1.0,
            fc: 0.25,
            order: 1,
            gain: 0.0,
            pre_gain: false,
            one_db: false,
        }
    }
}

/// Design a cascade of biquad stages.
///
/// Each stage gets a quality factor and a corner-frequency scale from
/// the prototype stage table, then goes through the single-stage
/// designer for the requested behavior. For highpass behaviors the
/// stage corner is `Fc / f`; for all others it is `Fc · f`.
pub fn calc_cascade(params: &CascadeParams) -> DspResult<Vec<BiquadCoeffs>> {
    let order = params.order.min(MAX_CASCADE_STAGES);

    if params.transform == Transform::MatchedZ {
        let table = bessel_mz_stages(order, params.one_db);
        if table.len() != order {
            return Err(DspError::DesignFailed("matched-z prototype table"));
        }
        return table
            .into_iter()
            .map(|(a_s, b_s)| biquad::lowpass_mz(params.fs, params.fc, a_s, b_s, params.pre_gain))
            .collect();
    }

    let table = stage_table(params.characteristic, order, params.one_db);
    if table.len() != order {
        return Err(DspError::DesignFailed("prototype stage table"));
    }
    let mut out = Vec::with_capacity(order);
    for (q, f) in table {
        let mut fd = f;
        // The Bessel prototype's group-delay normalization lands the
        // geometric band center off target for band filters.
        if params.characteristic == Characteristic::Bessel
            && matches!(
                params.behavior,
                FilterBehavior::Bandpass | FilterBehavior::BandpassQ | FilterBehavior::Bandstop
            )
        {
            fd *= (order as f64).sqrt() / order as f64;
        }
        let fc = match params.behavior {
            FilterBehavior::Highpass | FilterBehavior::HighpassBt => params.fc / fd,
            _ => params.fc * fd,
        };
        out.push(design_stage(params, fc, q)?);
    }
    Ok(out)
}

fn design_stage(params: &CascadeParams, fc: f64, q: f64) -> DspResult<BiquadCoeffs> {
    let p = IirParams {
        fs: params.fs,
        fc,
        q: Some(q),
        bw: None,
        gain: params.gain,
        pre_gain: params.pre_gain,
    };
    match params.behavior {
        FilterBehavior::Lowpass => biquad::lowpass(&p),
        FilterBehavior::Highpass => biquad::highpass(&p),
        FilterBehavior::Bandpass => biquad::bandpass(&p),
        FilterBehavior::BandpassQ => biquad::bandpass_q(&p),
        FilterBehavior::Bandstop => biquad::bandstop(&p),
        FilterBehavior::Allpass => biquad::allpass(&p),
        FilterBehavior::Peak => biquad::peak(&p),
        FilterBehavior::Lowshelf => biquad::lowshelf(&p),
        FilterBehavior::Highshelf => biquad::highshelf(&p),
        FilterBehavior::LowpassBt => Ok(biquad::lowpass_bt(params.fs, fc)),
        FilterBehavior::HighpassBt => Ok(biquad::highpass_bt(params.fs, fc)),
    }
}

/// Per-stage (Q, frequency scale) pairs, sorted by ascending Q.
fn stage_table(characteristic: Characteristic, stages: usize, one_db: bool) -> Vec<(f64, f64)> {
    match characteristic {
        Characteristic::Butterworth => {
            let n = stages as f64;
            let mut table: Vec<(f64, f64)> = (0..stages)
                .map(|i| {
                    let q = 0.5 / (PI / (2.0 * n) * (i as f64 + 0.5)).sin();
                    (q, 1.0)
                })
                .collect();
            table.sort_by(|a, b| a.0.total_cmp(&b.0));
            table
        }
        Characteristic::Bessel => pole_stage_table(&bessel_poles(2 * stages), one_db),
        _ => {
            let ripple = characteristic.ripple_db().unwrap_or(0.5);
            pole_stage_table(&chebyshev_poles(2 * stages, ripple), one_db)
        }
    }
}

/// Convert an analog prototype pole set into per-stage (Q, f) pairs,
/// normalized so f = 1 corresponds to the -3 dB (or -1 dB) point.
fn pole_stage_table(poles: &[Complex64], one_db: bool) -> Vec<(f64, f64)> {
    let w_cut = cutoff_frequency(poles, if one_db { 1.0 } else { 3.0 });
    let mut table: Vec<(f64, f64)> = poles
        .iter()
        .filter(|p| p.im > 1e-9)
        .map(|p| {
            let q = p.norm() / (2.0 * p.re.abs());
            (q, p.norm() / w_cut)
        })
        .collect();
    table.sort_by(|a, b| a.0.total_cmp(&b.0));
    table
}

/// Matched-Z per-stage analog coefficients (as, bs) for the stage
/// prototype 1/(bs·s² + as·s + 1), derived from the normalized Bessel
/// pole pairs.
fn bessel_mz_stages(stages: usize, one_db: bool) -> Vec<(f64, f64)> {
    let poles = bessel_poles(2 * stages);
    let w_cut = cutoff_frequency(&poles, if one_db { 1.0 } else { 3.0 });
    let mut table: Vec<(f64, f64)> = poles
        .iter()
        .filter(|p| p.im > 1e-9)
        .map(|p| {
            let p = *p / w_cut;
            let mag2 = p.norm_sqr();
            (-2.0 * p.re / mag2, 1.0 / mag2)
        })
        .collect();
    // Low-as stages first, mirroring ascending-Q ordering.
    table.sort_by(|a, b| b.0.total_cmp(&a.0));
    table
}

/// Gain of the DC-normalized all-pole prototype at frequency w.
fn prototype_magnitude(poles: &[Complex64], w: f64) -> f64 {
    let jw = Complex64::new(0.0, w);
    poles.iter().map(|p| p.norm() / (jw - p).norm()).product()
}

/// Locate the frequency where the prototype response is `atten_db`
/// below its passband peak. Scans a log grid for the outermost crossing
/// (Chebyshev responses ripple, so the first crossing is not enough),
/// then refines by bisection.
fn cutoff_frequency(poles: &[Complex64], atten_db: f64) -> f64 {
    const GRID: usize = 4000;
    let lo_exp = -3.0;
    let hi_exp = 1.0;
    let grid_w = |i: usize| 10f64.powf(lo_exp + (hi_exp - lo_exp) * i as f64 / GRID as f64);

    let mut peak = prototype_magnitude(poles, 0.0);
    for i in 0..=GRID {
        peak = peak.max(prototype_magnitude(poles, grid_w(i)));
    }
    let target = peak * 10f64.powf(-atten_db / 20.0);

    let mut last_above = 0;
    for i in 0..=GRID {
        if prototype_magnitude(poles, grid_w(i)) >= target {
            last_above = i;
        }
    }
    if last_above == GRID {
        return grid_w(GRID);
    }

    let (mut lo, mut hi) = (grid_w(last_above), grid_w(last_above + 1));
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if prototype_magnitude(poles, mid) >= target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Poles of the Bessel lowpass prototype of the given (even) order:
/// roots of the reverse Bessel polynomial, found with Durand-Kerner.
fn bessel_poles(order: usize) -> Vec<Complex64> {
    // theta_n coefficients: a_k = (2n-k)! / (2^(n-k) k! (n-k)!).
    let n = order;
    let mut coeffs = Vec::with_capacity(n + 1);
    for k in 0..=n {
        let num = factorial(2 * n - k);
        let den = 2f64.powi((n - k) as i32) * factorial(k) * factorial(n - k);
        coeffs.push(num / den);
    }
    polynomial_roots(&coeffs)
}

fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, i| acc * i as f64)
}

/// Poles of the Chebyshev type I prototype, normalized to the ripple
/// edge at w = 1.
fn chebyshev_poles(order: usize, ripple_db: f64) -> Vec<Complex64> {
    let epsilon = (10f64.powf(ripple_db / 10.0) - 1.0).sqrt();
    let mu = (1.0 / epsilon).asinh() / order as f64;
    let (sh, ch) = (mu.sinh(), mu.cosh());
    (0..order)
        .map(|m| {
            let theta = PI * (2.0 * m as f64 + 1.0) / (2.0 * order as f64);
            Complex64::new(-sh * theta.sin(), ch * theta.cos())
        })
        .collect()
}

/// All roots of a real polynomial (ascending coefficients) via the
/// Durand-Kerner iteration.
///
/// The reverse Bessel roots of a degree-2n polynomial sit in a narrow
/// annulus around the geometric mean of their magnitudes, which for a
/// monic polynomial is `|a0|^(1/n)`. Seeding on that circle (with an
/// angular offset so the seed set is not conjugate-symmetric) keeps the
/// iteration convergent through degree 24; seeds near the unit circle
/// stall once the roots grow past magnitude ~5.
fn polynomial_roots(coeffs: &[f64]) -> Vec<Complex64> {
    let degree = coeffs.len() - 1;
    let lead = coeffs[degree];
    let monic: Vec<f64> = coeffs.iter().map(|c| c / lead).collect();

    let eval = |z: Complex64| -> Complex64 {
        monic
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
    };

    let radius = monic[0].abs().powf(1.0 / degree as f64).max(1e-3);
    let mut roots: Vec<Complex64> = (0..degree)
        .map(|k| Complex64::from_polar(radius, 2.0 * PI * k as f64 / degree as f64 + 0.35))
        .collect();
    for _ in 0..1000 {
        let mut step = 0.0f64;
        for i in 0..degree {
            let mut denom = Complex64::new(1.0, 0.0);
            for j in 0..degree {
                if j != i {
                    denom *= roots[i] - roots[j];
                }
            }
            let delta = eval(roots[i]) / denom;
            roots[i] -= delta;
            step = step.max(delta.norm());
        }
        if step < 1e-12 * radius {
            break;
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_behavior_parse_round_trip() {
        assert_eq!(
            "bandpassQ".parse::<FilterBehavior>().unwrap(),
            FilterBehavior::BandpassQ
        );
        assert_eq!(
            "lowpassBT".parse::<FilterBehavior>().unwrap(),
            FilterBehavior::LowpassBt
        );
    }

    #[test]
    fn test_unknown_behavior_names_offender() {
        let err = "sharpen".parse::<FilterBehavior>().unwrap_err();
        match err {
            DspError::UnknownBehavior(name) => assert_eq!(name, "sharpen"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_butterworth_stage_qs() {
        let table = stage_table(Characteristic::Butterworth, 2, false);
        // Classic 4th-order Butterworth section Qs.
        assert_relative_eq!(table[0].0, 0.54119610, epsilon = 1e-7);
        assert_relative_eq!(table[1].0, 1.30656296, epsilon = 1e-7);
        assert_relative_eq!(table[0].1, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_single_stage_butterworth_q() {
        let table = stage_table(Characteristic::Butterworth, 1, false);
        assert_relative_eq!(table[0].0, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_bessel_poles_match_prototype() {
        // 2nd-order reverse Bessel polynomial s^2 + 3s + 3 has poles
        // -1.5 +/- j0.866.
        let poles = bessel_poles(2);
        let mut mags: Vec<f64> = poles.iter().map(|p| p.norm()).collect();
        mags.sort_by(f64::total_cmp);
        assert_relative_eq!(mags[0], 3f64.sqrt(), epsilon = 1e-9);
        assert!(poles.iter().all(|p| p.re < 0.0));
    }

    #[test]
    fn test_bessel_poles_high_order() {
        // Degree 14 and up is where naive unit-circle seeding diverges.
        for stages in 7..=MAX_CASCADE_STAGES {
            let poles = bessel_poles(2 * stages);
            assert_eq!(poles.len(), 2 * stages);
            assert!(
                poles.iter().all(|p| p.re < 0.0 && p.is_finite()),
                "unstable or non-finite pole at {stages} stages"
            );
            let pairs = poles.iter().filter(|p| p.im > 1e-9).count();
            assert_eq!(pairs, stages, "conjugate pairing broken at {stages} stages");
        }
    }

    #[test]
    fn test_bessel_stage_table_2nd_order() {
        let table = stage_table(Characteristic::Bessel, 1, false);
        // Normalized 2nd-order Bessel: Q = sqrt(3)/3 ≈ 0.577, the -3 dB
        // point sits at 1.272x the pole magnitude normalization.
        assert_relative_eq!(table[0].0, 0.57735, epsilon = 1e-4);
        assert_relative_eq!(table[0].1, 1.27202, epsilon = 1e-4);
    }

    #[test]
    fn test_bessel_matched_z_stage_2nd_order() {
        let table = bessel_mz_stages(1, false);
        let (a_s, b_s) = table[0];
        assert_relative_eq!(a_s, 1.36165, epsilon = 1e-4);
        assert_relative_eq!(b_s, 0.61803, epsilon = 1e-4);
    }

    #[test]
    fn test_chebyshev_3db_edge_at_unity() {
        // With 3 dB ripple, the -3 dB point coincides with the ripple
        // edge, so the frequency scale of the outermost stage pair
        // reflects poles normalized to w = 1.
        let poles = chebyshev_poles(4, 3.0);
        let w = cutoff_frequency(&poles, 3.0);
        assert_relative_eq!(w, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_one_db_widens_frequency_scale() {
        let t3 = stage_table(Characteristic::Bessel, 2, false);
        let t1 = stage_table(Characteristic::Bessel, 2, true);
        // The -1 dB point sits below the -3 dB point, so normalizing to
        // it scales stage frequencies up.
        assert!(t1[0].1 > t3[0].1);
    }

    #[test]
    fn test_cascade_len_and_clamp() {
        let stages = calc_cascade(&CascadeParams {
            order: 40,
            fs: 250.0,
            fc: 30.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(stages.len(), MAX_CASCADE_STAGES);
        assert!(stages.iter().all(BiquadCoeffs::is_stable));
    }

    #[test]
    fn test_cascade_lowpass_symmetry() {
        let stages = calc_cascade(&CascadeParams {
            order: 3,
            fs: 250.0,
            fc: 30.0,
            characteristic: Characteristic::Chebyshev1,
            ..Default::default()
        })
        .unwrap();
        for s in &stages {
            assert_relative_eq!(s.b[0], s.b[2], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_cascade_highpass_sign() {
        let stages = calc_cascade(&CascadeParams {
            behavior: FilterBehavior::Highpass,
            order: 2,
            fs: 250.0,
            fc: 1.0,
            ..Default::default()
        })
        .unwrap();
        for s in &stages {
            assert!(s.b[1] < 0.0);
            assert_relative_eq!(s.b[0], s.b[2], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_cascade_full_order_sweep_every_characteristic() {
        let characteristics = [
            Characteristic::Butterworth,
            Characteristic::Bessel,
            Characteristic::Chebyshev05,
            Characteristic::Chebyshev1,
            Characteristic::Chebyshev2,
            Characteristic::Chebyshev3,
        ];
        for characteristic in characteristics {
            for order in 1..=MAX_CASCADE_STAGES {
                let stages = calc_cascade(&CascadeParams {
                    characteristic,
                    order,
                    fs: 250.0,
                    fc: 20.0,
                    ..Default::default()
                })
                .unwrap();
                assert_eq!(stages.len(), order, "{characteristic:?} order {order}");
                for s in &stages {
                    assert!(
                        s.b.iter().chain(s.a.iter()).all(|c| c.is_finite()) && s.k.is_finite(),
                        "non-finite coefficient, {characteristic:?} order {order}"
                    );
                    assert!(s.is_stable(), "unstable stage, {characteristic:?} order {order}");
                    let dc = s.k * s.b.iter().sum::<f64>() / (1.0 + s.a[0] + s.a[1]);
                    assert_relative_eq!(dc, 1.0, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_matched_z_full_order_sweep() {
        for order in 1..=MAX_CASCADE_STAGES {
            let stages = calc_cascade(&CascadeParams {
                transform: Transform::MatchedZ,
                characteristic: Characteristic::Bessel,
                order,
                fs: 250.0,
                fc: 10.0,
                ..Default::default()
            })
            .unwrap();
            assert_eq!(stages.len(), order, "matched-z order {order}");
            for s in &stages {
                assert!(s.b.iter().chain(s.a.iter()).all(|c| c.is_finite()));
                assert!(s.is_stable(), "unstable matched-z stage at order {order}");
                let dc = s.k * s.b.iter().sum::<f64>() / (1.0 + s.a[0] + s.a[1]);
                assert_relative_eq!(dc, 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_matched_z_cascade_dc_unity() {
        let stages = calc_cascade(&CascadeParams {
            transform: Transform::MatchedZ,
            characteristic: Characteristic::Bessel,
            order: 2,
            fs: 250.0,
            fc: 10.0,
            ..Default::default()
        })
        .unwrap();
        for s in &stages {
            let dc = s.k * s.b.iter().sum::<f64>() / (1.0 + s.a[0] + s.a[1]);
            assert_relative_eq!(dc, 1.0, epsilon = 1e-9);
            assert!(s.is_stable());
        }
    }
}
