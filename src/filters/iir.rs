//! Streaming IIR filter engine
//!
//! Runs a cascade of biquad stages in transposed direct form II, two
//! state words per stage. Coefficients come from
//! [`crate::filters::biquad`] or [`crate::filters::cascade`]; this type
//! owns only the run-time state.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::filters::cascade::{calc_cascade, CascadeParams};
//! use psg_dsp::filters::IirFilter;
//!
//! let stages = calc_cascade(&CascadeParams {
//!     fs: 250.0,
//!     fc: 30.0,
//!     order: 2,
//!     ..Default::default()
//! })
//! .unwrap();
//! let mut filter = IirFilter::new(stages).unwrap();
//! let y = filter.process(1.0);
//! assert!(y.is_finite());
//! ```

use crate::filters::biquad::BiquadCoeffs;
use crate::filters::cascade::{calc_cascade, CascadeParams};
use crate::filters::{unwrap_phases, FrequencyPoint};
use crate::types::{DspError, DspResult};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Poles and zeros of one biquad stage.
#[derive(Debug, Clone, Copy)]
pub struct StagePolesZeros {
    pub poles: [Complex64; 2],
    pub zeros: [Complex64; 2],
}

/// Cascaded biquad IIR filter with per-stage transposed DF-II state.
#[derive(Debug, Clone)]
pub struct IirFilter {
    stages: Vec<BiquadCoeffs>,
    state: Vec<[f64; 2]>,
}

impl IirFilter {
    /// Create a filter from a non-empty stage list.
    pub fn new(stages: Vec<BiquadCoeffs>) -> DspResult<Self> {
        if stages.is_empty() {
            return Err(DspError::EmptyInput("stages"));
        }
        let state = vec![[0.0; 2]; stages.len()];
        Ok(Self { stages, state })
    }

    /// Design and wrap a cascade in one step.
    pub fn from_cascade(params: &CascadeParams) -> DspResult<Self> {
        Self::new(calc_cascade(params)?)
    }

    /// Number of biquad stages.
    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    /// The stage coefficients.
    pub fn stages(&self) -> &[BiquadCoeffs] {
        &self.stages
    }

    /// Process one sample through every stage.
    pub fn process(&mut self, input: f64) -> f64 {
        let mut x = input;
        for (coeffs, state) in self.stages.iter().zip(self.state.iter_mut()) {
            x *= coeffs.k;
            let y = coeffs.b[0] * x + state[0];
            state[0] = coeffs.b[1] * x - coeffs.a[0] * y + state[1];
            state[1] = coeffs.b[2] * x - coeffs.a[1] * y;
            x = y;
        }
        x
    }

    /// Process a block, returning a new vector.
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process(x)).collect()
    }

    /// Process a block in place.
    pub fn process_inplace(&mut self, samples: &mut [f64]) {
        for s in samples.iter_mut() {
            *s = self.process(*s);
        }
    }

    /// Run a block through a fresh copy of the filter, leaving the
    /// streaming state untouched.
    pub fn simulate(&self, input: &[f64]) -> Vec<f64> {
        let mut scratch = self.clone();
        scratch.reset();
        scratch.process_block(input)
    }

    /// Zero-phase filtering: forward pass, then a reversed pass over the
    /// reversed intermediate.
    ///
    /// Both passes start from zeroed stage state, so the result depends
    /// only on `input`; the streaming state is neither consumed nor
    /// modified.
    pub fn filtfilt(&self, input: &[f64]) -> Vec<f64> {
        let mut forward = self.simulate(input);
        forward.reverse();
        let mut backward = self.simulate(&forward);
        backward.reverse();
        backward
    }

    /// Clear all stage state.
    pub fn reset(&mut self) {
        for s in self.state.iter_mut() {
            *s = [0.0; 2];
        }
    }

    /// Evaluate the cascade transfer function at z = e^(j·2π·f), with f
    /// the frequency as a fraction of the sample rate.
    fn evaluate(&self, frequency_fraction: f64) -> Complex64 {
        let theta = -2.0 * PI * frequency_fraction;
        let z1 = Complex64::from_polar(1.0, theta);
        let z2 = Complex64::from_polar(1.0, 2.0 * theta);
        let mut h = Complex64::new(1.0, 0.0);
        for c in &self.stages {
            let num = c.b[0] + c.b[1] * z1 + c.b[2] * z2;
            let den = 1.0 + c.a[0] * z1 + c.a[1] * z2;
            h *= c.k * num / den;
        }
        h
    }

    /// Frequency response at a single frequency in Hz.
    pub fn response_at(&self, fs: f64, fr: f64) -> FrequencyPoint {
        FrequencyPoint::from_complex(self.evaluate(fr / fs))
    }

    /// Frequency response at `resolution` evenly spaced points from DC
    /// to Nyquist, with the phase unwrapped across points.
    pub fn response(&self, resolution: usize) -> Vec<FrequencyPoint> {
        let mut points: Vec<FrequencyPoint> = (0..resolution)
            .map(|i| FrequencyPoint::from_complex(self.evaluate(i as f64 / (2.0 * resolution as f64))))
            .collect();
        unwrap_phases(&mut points);
        points
    }

    /// Per-stage poles and zeros from the quadratic formula.
    pub fn poles_zeros(&self) -> Vec<StagePolesZeros> {
        self.stages
            .iter()
            .map(|c| StagePolesZeros {
                poles: quadratic_roots(1.0, c.a[0], c.a[1]),
                zeros: quadratic_roots(c.b[0], c.b[1], c.b[2]),
            })
            .collect()
    }

    /// First `length` samples of the unit-step response.
    pub fn step_response(&self, length: usize) -> Vec<f64> {
        self.simulate(&vec![1.0; length])
    }

    /// True when every stage has both poles inside the unit circle.
    pub fn is_stable(&self) -> bool {
        self.stages.iter().all(BiquadCoeffs::is_stable)
    }
}

/// Roots of c0·z² + c1·z + c2. A degenerate leading coefficient pins
/// the vanished root at the origin.
fn quadratic_roots(c0: f64, c1: f64, c2: f64) -> [Complex64; 2] {
    if c0 == 0.0 {
        let root = if c1 == 0.0 { 0.0 } else { -c2 / c1 };
        return [Complex64::new(root, 0.0), Complex64::new(0.0, 0.0)];
    }
    let disc = Complex64::new(c1 * c1 - 4.0 * c0 * c2, 0.0).sqrt();
    [
        (-c1 + disc) / (2.0 * c0),
        (-c1 - disc) / (2.0 * c0),
    ]
}
