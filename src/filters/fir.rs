//! Streaming FIR filter engine
//!
//! Runs a direct-form FIR over a circular delay line. Coefficient
//! design lives in [`crate::filters::fir_design`]; this type only owns
//! the run-time state, so the same tap set can drive any number of
//! concurrently streaming channels.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::filters::{fir_design, FirFilter};
//!
//! let taps = fir_design::lowpass(250.0, 30.0, 32);
//! let mut filter = FirFilter::new(taps).unwrap();
//! let y = filter.process(1.0);
//! assert!(y.abs() < 1.0);
//! ```

use crate::filters::{evaluate_taps, unwrap_phases, FrequencyPoint};
use crate::types::{DspError, DspResult};

/// Direct-form FIR filter with persistent delay-line state.
#[derive(Debug, Clone)]
pub struct FirFilter {
    taps: Vec<f64>,
    delay: Vec<f64>,
    pos: usize,
}

impl FirFilter {
    /// Create a filter from a non-empty tap vector.
    pub fn new(taps: Vec<f64>) -> DspResult<Self> {
        if taps.is_empty() {
            return Err(DspError::EmptyInput("taps"));
        }
        let len = taps.len();
        Ok(Self {
            taps,
            delay: vec![0.0; len],
            pos: 0,
        })
    }

    /// Number of taps.
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// The coefficient vector.
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Process one sample through the delay line.
    ///
    /// A single-tap filter degenerates to a pure gain.
    pub fn process(&mut self, input: f64) -> f64 {
        if self.taps.len() == 1 {
            return self.taps[0] * input;
        }
        self.delay[self.pos] = input;
        let n = self.taps.len();
        let mut acc = 0.0;
        for (j, tap) in self.taps.iter().enumerate() {
            acc += tap * self.delay[(self.pos + n - j) % n];
        }
        self.pos = (self.pos + 1) % n;
        acc
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
    /// reversed intermediate. A single-tap filter applies its gain
    /// squared.
    ///
    /// Both passes start from zeroed delay lines, so the result depends
    /// only on `input`; the streaming state is neither consumed nor
    /// modified.
    pub fn filtfilt(&self, input: &[f64]) -> Vec<f64> {
        if self.taps.len() == 1 {
            let k2 = self.taps[0] * self.taps[0];
            return input.iter().map(|&x| k2 * x).collect();
        }
        let mut forward = self.simulate(input);
        forward.reverse();
        let mut backward = self.simulate(&forward);
        backward.reverse();
        backward
    }

    /// Clear the delay line.
    pub fn reset(&mut self) {
        self.delay.fill(0.0);
        self.pos = 0;
    }

    /// Frequency response at a single frequency, in Hz relative to the
    /// given sample rate.
    pub fn response_at(&self, fs: f64, fr: f64) -> FrequencyPoint {
        FrequencyPoint::from_complex(evaluate_taps(&self.taps, fr / fs))
    }

    /// Frequency response at `resolution` evenly spaced points from DC
    /// to Nyquist, with the phase unwrapped across points.
    pub fn response(&self, resolution: usize) -> Vec<FrequencyPoint> {
        let mut points: Vec<FrequencyPoint> = (0..resolution)
            .map(|i| {
                FrequencyPoint::from_complex(evaluate_taps(
                    &self.taps,
                    i as f64 / (2.0 * resolution as f64),
                ))
            })
            .collect();
        unwrap_phases(&mut points);
        points
    }
}
