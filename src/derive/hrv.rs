//! Heart-rate variability derivation
//!
//! Turns a stream of heart-rate measurements into an RMSSD series
//! (root mean square of successive RR-interval differences) over a
//! sliding window of accepted beats. Physiologically implausible
//! intervals and abrupt jumps are rejected before they enter the
//! window, so a dropped beat or sensor artifact cannot spike the
//! variability estimate.

use crate::measurement::HeartRateMeasurement;
use crate::ring_buffer::RingBuffer;
use crate::types::DspResult;
use tracing::debug;

/// Default number of accepted RR intervals in the sliding window.
pub const DEFAULT_WINDOW: usize = 30;
/// Accepted RR interval range in milliseconds (200 to 30 bpm).
pub const RR_MIN_MS: f64 = 300.0;
pub const RR_MAX_MS: f64 = 2000.0;
/// Largest accepted difference from the previous accepted interval.
pub const RR_MAX_JUMP_MS: f64 = 250.0;

/// One annotated output per input measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HrvOutput {
    /// Measurement timestamp in epoch milliseconds.
    pub timestamp: f64,
    /// Heart rate carried through from the measurement.
    pub heart_rate_bpm: f64,
    /// RMSSD in milliseconds, `None` until the window holds at least
    /// two accepted intervals.
    pub rmssd: Option<f64>,
}

/// Sliding-window RMSSD processor.
#[derive(Debug, Clone)]
pub struct HrvProcessor {
    window: RingBuffer<f64>,
    last_accepted: Option<f64>,
}

impl HrvProcessor {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
            .unwrap_or_else(|_| unreachable!("default window is non-zero"))
    }

    /// Processor with an explicit window size (must be non-zero).
    pub fn with_window(window_size: usize) -> DspResult<Self> {
        Ok(Self {
            window: RingBuffer::new(window_size)?,
            last_accepted: None,
        })
    }

    /// Number of RR intervals currently in the window.
    pub fn accepted(&self) -> usize {
        self.window.len()
    }

    /// Absorb one measurement and emit the heart rate annotated with
    /// the current RMSSD. Emits exactly one output per input.
    pub fn process(&mut self, measurement: &HeartRateMeasurement) -> HrvOutput {
        for &rr_seconds in &measurement.rr_intervals {
            let rr = rr_seconds * 1000.0;
            if !(RR_MIN_MS..=RR_MAX_MS).contains(&rr) {
                debug!(rr, "rr interval out of range, rejected");
                continue;
            }
            if let Some(last) = self.last_accepted {
                if (rr - last).abs() > RR_MAX_JUMP_MS {
                    debug!(rr, last, "rr interval jump, rejected");
                    continue;
                }
            }
            self.window.push(rr);
            self.last_accepted = Some(rr);
        }

        HrvOutput {
            timestamp: measurement.timestamp,
            heart_rate_bpm: measurement.heart_rate_bpm,
            rmssd: self.rmssd(),
        }
    }

    /// RMSSD over the current window, `None` with fewer than two
    /// accepted intervals.
    pub fn rmssd(&self) -> Option<f64> {
        if self.window.len() < 2 {
            return None;
        }
        let intervals: Vec<f64> = self.window.iter().copied().collect();
        let sum_sq: f64 = intervals
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).powi(2))
            .sum();
        Some((sum_sq / (intervals.len() - 1) as f64).sqrt())
    }

    /// Drop all window state.
    pub fn reset(&mut self) {
        self.window.clear();
        self.last_accepted = None;
    }
}

impl Default for HrvProcessor {
    fn default() -> Self {
        Self::new()
    }
}
