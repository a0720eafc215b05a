//! Polyphase rational-rate resampler
//!
//! Streaming sample-rate conversion by a rational factor L/M: the
//! requested rate ratio is approximated by a continued fraction with
//! both terms bounded, a Kaiser-windowed sinc prototype is designed at
//! the common upsampled rate, and its polyphase decomposition runs one
//! dot product per output sample. No per-sample allocation happens
//! after construction.
//!
//! Output timestamps follow the effective rational rate and are shifted
//! back by the prototype's group delay, so a resampled sine lines up in
//! time with the input sine.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::resample::PolyphaseResampler;
//! use psg_dsp::types::Sample;
//!
//! let mut resampler = PolyphaseResampler::new(250.0, 100.0, 16).unwrap();
//! let input: Vec<Sample> = (0..250)
//!     .map(|i| Sample::new(i as f64 * 4.0, 1.0))
//!     .collect();
//! let output = resampler.process(&input);
//! assert!(!output.is_empty());
//! ```

use crate::filters::windows::{kaiser_beta_from_attenuation, kaiser_window};
use crate::types::{DspError, DspResult, Sample, Series};
use std::f64::consts::PI;
use tracing::debug;

/// Bound on the numerator and denominator of the rational rate ratio.
pub const MAX_RATE_TERM: usize = 1024;

/// Default stopband attenuation of the anti-aliasing prototype, in dB.
pub const DEFAULT_ATTENUATION_DB: f64 = 60.0;

/// Streaming rational resampler with persistent filter state.
#[derive(Debug, Clone)]
pub struct PolyphaseResampler {
    input_rate: f64,
    up: usize,
    down: usize,
    taps_per_phase: usize,
    /// `up` rows of `taps_per_phase` coefficients; row p, column k
    /// weights the input sample k steps back for output phase p.
    phases: Vec<Vec<f64>>,
    history: Vec<f64>,
    hist_pos: usize,
    hist_filled: usize,
    phase: usize,
    /// Timestamp of the first input sample, in epoch milliseconds.
    anchor: Option<f64>,
    outputs_emitted: u64,
    /// Prototype group delay in milliseconds.
    group_delay_ms: f64,
}

impl PolyphaseResampler {
    /// Build a resampler converting `input_rate` Hz to approximately
    /// `output_rate` Hz with `taps_per_phase` coefficients per phase.
    pub fn new(input_rate: f64, output_rate: f64, taps_per_phase: usize) -> DspResult<Self> {
        Self::with_attenuation(input_rate, output_rate, taps_per_phase, DEFAULT_ATTENUATION_DB)
    }

    /// As [`PolyphaseResampler::new`] with an explicit prototype
    /// stopband attenuation.
    pub fn with_attenuation(
        input_rate: f64,
        output_rate: f64,
        taps_per_phase: usize,
        attenuation_db: f64,
    ) -> DspResult<Self> {
        if !(input_rate.is_finite() && input_rate > 0.0) {
            return Err(DspError::InvalidRate(input_rate));
        }
        if !(output_rate.is_finite() && output_rate > 0.0) {
            return Err(DspError::InvalidRate(output_rate));
        }
        if taps_per_phase == 0 {
            return Err(DspError::InvalidCapacity(0));
        }

        let (up, down) = rational_approx(output_rate / input_rate, MAX_RATE_TERM);
        debug!(input_rate, output_rate, up, down, "resampler ratio");

        let phases = polyphase_bank(up, down, taps_per_phase, attenuation_db);
        let n_taps = taps_per_phase * up;
        let group_delay_ms = 1000.0 * (n_taps - 1) as f64 / (2.0 * up as f64 * input_rate);

        Ok(Self {
            input_rate,
            up,
            down,
            taps_per_phase,
            phases,
            history: vec![0.0; taps_per_phase],
            hist_pos: 0,
            hist_filled: 0,
            phase: 0,
            anchor: None,
            outputs_emitted: 0,
            group_delay_ms,
        })
    }

    /// Interpolation factor of the rational approximation.
    pub fn up_factor(&self) -> usize {
        self.up
    }

    /// Decimation factor of the rational approximation.
    pub fn down_factor(&self) -> usize {
        self.down
    }

    /// Effective output rate in Hz: input rate scaled by the realized
    /// rational ratio, which may differ slightly from the requested rate.
    pub fn effective_output_rate(&self) -> f64 {
        self.input_rate * self.up as f64 / self.down as f64
    }

    /// Feed a chunk of input samples, appending any produced output to
    /// `out`. Chunks may be any size; state carries across calls.
    pub fn process_into(&mut self, input: &[Sample], out: &mut Vec<Sample>) {
        for s in input {
            if self.anchor.is_none() {
                self.anchor = Some(s.timestamp);
            }
            self.push(s.value);
            while self.phase < self.up {
                let value = self.dot(self.phase);
                out.push(Sample::new(self.next_timestamp(), value));
                self.outputs_emitted += 1;
                self.phase += self.down;
            }
            self.phase -= self.up;
        }
    }

    /// Feed a chunk of input samples and return the produced output.
    pub fn process(&mut self, input: &[Sample]) -> Series {
        let mut out = Vec::with_capacity(input.len() * self.up / self.down + 2);
        self.process_into(input, &mut out);
        out
    }

    /// Reset the streaming state, keeping the designed filter bank.
    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.hist_pos = 0;
        self.hist_filled = 0;
        self.phase = 0;
        self.anchor = None;
        self.outputs_emitted = 0;
    }

    fn push(&mut self, value: f64) {
        self.hist_pos = (self.hist_pos + 1) % self.taps_per_phase;
        self.history[self.hist_pos] = value;
        self.hist_filled = (self.hist_filled + 1).min(self.taps_per_phase);
    }

    /// Dot product of one phase row against the delay line, normalized
    /// by the weight actually applied. During warm-up only part of the
    /// row overlaps real samples; dividing by the overlapped weight sum
    /// keeps DC gain at unity from the very first output.
    fn dot(&self, phase: usize) -> f64 {
        let coeffs = &self.phases[phase];
        let n = self.taps_per_phase;
        let mut acc = 0.0;
        let mut weight = 0.0;
        for (k, &c) in coeffs.iter().take(self.hist_filled).enumerate() {
            acc += c * self.history[(self.hist_pos + n - k) % n];
            weight += c;
        }
        if weight.abs() > 1e-12 {
            acc / weight
        } else {
            acc
        }
    }

    fn next_timestamp(&self) -> f64 {
        let anchor = self.anchor.unwrap_or(0.0);
        let step_ms = 1000.0 * self.down as f64 / (self.up as f64 * self.input_rate);
        anchor + self.outputs_emitted as f64 * step_ms - self.group_delay_ms
    }
}

/// Best rational approximation p/q of `ratio` with p, q bounded by
/// `limit`, via continued-fraction convergents. Ratios outside
/// [1/limit, limit] saturate at the boundary fraction.
fn rational_approx(ratio: f64, limit: usize) -> (usize, usize) {
    if ratio >= limit as f64 {
        return (limit, 1);
    }
    if ratio <= 1.0 / limit as f64 {
        return (1, limit);
    }
    let mut x = ratio;
    let (mut h0, mut h1) = (0u64, 1u64);
    let (mut k0, mut k1) = (1u64, 0u64);
    for _ in 0..64 {
        let a = x.floor();
        let h2 = a as u64 * h1 + h0;
        let k2 = a as u64 * k1 + k0;
        if h2 > limit as u64 || k2 > limit as u64 {
            break;
        }
        h0 = h1;
        h1 = h2;
        k0 = k1;
        k1 = k2;
        let frac = x - a;
        if frac < 1e-12 {
            break;
        }
        x = 1.0 / frac;
    }
    ((h1.max(1)) as usize, (k1.max(1)) as usize)
}

/// Kaiser-windowed sinc prototype at the upsampled rate, decomposed
/// into `up` phase rows. The cutoff sits at the narrower of the input
/// and output Nyquist frequencies.
fn polyphase_bank(
    up: usize,
    down: usize,
    taps_per_phase: usize,
    attenuation_db: f64,
) -> Vec<Vec<f64>> {
    let full_len = taps_per_phase * up;
    // Odd length puts the peak on a single center tap.
    let design_len = if full_len % 2 == 0 {
        full_len.saturating_sub(1).max(1)
    } else {
        full_len
    };
    let cutoff = 0.5 / up.max(down) as f64;
    let center = (design_len - 1) as f64 / 2.0;
    let beta = kaiser_beta_from_attenuation(attenuation_db);
    let window = kaiser_window(design_len, beta);

    let mut prototype = vec![0.0; full_len];
    for i in 0..design_len {
        let n = i as f64 - center;
        let sinc = if n.abs() < 1e-12 {
            2.0 * cutoff
        } else {
            (2.0 * PI * cutoff * n).sin() / (PI * n)
        };
        prototype[i] = sinc * window[i];
    }

    (0..up)
        .map(|p| (0..taps_per_phase).map(|k| prototype[k * up + p]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn constant_input(n: usize, rate_hz: f64, value: f64) -> Series {
        (0..n)
            .map(|i| Sample::new(i as f64 * 1000.0 / rate_hz, value))
            .collect()
    }

    #[test]
    fn test_invalid_rates_rejected() {
        assert!(PolyphaseResampler::new(0.0, 100.0, 16).is_err());
        assert!(PolyphaseResampler::new(100.0, -5.0, 16).is_err());
        assert!(PolyphaseResampler::new(100.0, f64::NAN, 16).is_err());
    }

    #[test]
    fn test_rational_approx_exact_ratios() {
        assert_eq!(rational_approx(0.4, 1024), (2, 5));
        assert_eq!(rational_approx(2.5, 1024), (5, 2));
        assert_eq!(rational_approx(1.0, 1024), (1, 1));
    }

    #[test]
    fn test_rational_approx_respects_bound() {
        let (p, q) = rational_approx(std::f64::consts::PI, 1024);
        assert!(p <= 1024 && q <= 1024);
        assert!((p as f64 / q as f64 - std::f64::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn test_rational_approx_saturates_extreme_ratios() {
        // Beyond the term bound the closest representable fraction is
        // the boundary itself, not 1/1.
        assert_eq!(rational_approx(5000.0, 1024), (1024, 1));
        assert_eq!(rational_approx(1.0 / 5000.0, 1024), (1, 1024));
        assert_eq!(rational_approx(1024.0, 1024), (1024, 1));
    }

    #[test]
    fn test_output_count_tracks_ratio() {
        let mut r = PolyphaseResampler::new(250.0, 100.0, 16).unwrap();
        let out = r.process(&constant_input(1000, 250.0, 1.0));
        // 2/5 of 1000 inputs, within one sample of phase rounding.
        assert!((out.len() as i64 - 400).abs() <= 1);
    }

    #[test]
    fn test_dc_gain_unity_from_first_output() {
        let mut r = PolyphaseResampler::new(250.0, 100.0, 16).unwrap();
        let out = r.process(&constant_input(500, 250.0, 3.5));
        for s in &out {
            assert_relative_eq!(s.value, 3.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_state_carries_across_chunks() {
        let input = constant_input(1000, 250.0, 2.0);
        let mut whole = PolyphaseResampler::new(250.0, 100.0, 16).unwrap();
        let expected = whole.process(&input);

        let mut chunked = PolyphaseResampler::new(250.0, 100.0, 16).unwrap();
        let mut got = Vec::new();
        for chunk in input.chunks(37) {
            chunked.process_into(chunk, &mut got);
        }
        assert_eq!(got.len(), expected.len());
        for (a, b) in got.iter().zip(&expected) {
            assert_relative_eq!(a.value, b.value, epsilon = 1e-12);
            assert_relative_eq!(a.timestamp, b.timestamp, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_timestamps_follow_effective_rate() {
        let mut r = PolyphaseResampler::new(250.0, 100.0, 16).unwrap();
        assert_relative_eq!(r.effective_output_rate(), 100.0, epsilon = 1e-12);
        let out = r.process(&constant_input(500, 250.0, 1.0));
        let step = out[1].timestamp - out[0].timestamp;
        assert_relative_eq!(step, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sine_preserved_after_group_delay() {
        // 2 Hz sine sampled at 250 Hz, resampled to 100 Hz. After the
        // warm-up region the output must track sin(2*pi*2*t) at the
        // reported timestamps.
        let f = 2.0;
        let input: Series = (0..2500)
            .map(|i| {
                let t_ms = i as f64 * 4.0;
                Sample::new(t_ms, (2.0 * PI * f * t_ms / 1000.0).sin())
            })
            .collect();
        let mut r = PolyphaseResampler::new(250.0, 100.0, 24).unwrap();
        let out = r.process(&input);
        for s in out.iter().skip(100).take(500) {
            let expected = (2.0 * PI * f * s.timestamp / 1000.0).sin();
            assert_relative_eq!(s.value, expected, epsilon = 0.02);
        }
    }

    #[test]
    fn test_upsampling_direction() {
        let mut r = PolyphaseResampler::new(100.0, 250.0, 16).unwrap();
        assert_eq!(r.up_factor(), 5);
        assert_eq!(r.down_factor(), 2);
        let out = r.process(&constant_input(200, 100.0, 1.0));
        assert!((out.len() as i64 - 500).abs() <= 2);
    }

    #[test]
    fn test_reset_restarts_stream() {
        let mut r = PolyphaseResampler::new(250.0, 100.0, 16).unwrap();
        let first = r.process(&constant_input(300, 250.0, 1.0));
        r.reset();
        let second = r.process(&constant_input(300, 250.0, 1.0));
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_relative_eq!(a.value, b.value, epsilon = 1e-12);
        }
    }
}
