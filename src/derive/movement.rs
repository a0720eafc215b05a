//! Movement magnitude derivation from accelerometry
//!
//! Highpass-filters each accelerometer axis to strip gravity and slow
//! postural drift, then emits the Euclidean norm of the residual as a
//! single activity series. One first-order Butterworth section per axis
//! keeps state independent, so a step on one axis cannot leak into the
//! others.

use crate::filters::biquad::highpass_first_order;
use crate::filters::IirFilter;
use crate::measurement::ImuMeasurement;
use crate::types::{DspResult, Sample};

/// Default highpass corner in Hz: well below voluntary movement but
/// above postural drift.
pub const DEFAULT_CUTOFF_HZ: f64 = 0.05;

/// Per-axis highpass plus vector magnitude.
#[derive(Debug, Clone)]
pub struct MovementProcessor {
    axes: [IirFilter; 3],
}

impl MovementProcessor {
    /// Processor for accelerometry sampled at `fs` Hz with the default
    /// gravity-rejection corner.
    pub fn new(fs: f64) -> DspResult<Self> {
        Self::with_cutoff(fs, DEFAULT_CUTOFF_HZ)
    }

    /// Processor with an explicit highpass corner.
    pub fn with_cutoff(fs: f64, cutoff_hz: f64) -> DspResult<Self> {
        let stage = highpass_first_order(fs, cutoff_hz);
        Ok(Self {
            axes: [
                IirFilter::new(vec![stage])?,
                IirFilter::new(vec![stage])?,
                IirFilter::new(vec![stage])?,
            ],
        })
    }

    /// Absorb one measurement and emit the movement magnitude in g.
    pub fn process(&mut self, measurement: &ImuMeasurement) -> Sample {
        let mut sum_sq = 0.0;
        for (filter, &a) in self.axes.iter_mut().zip(&measurement.acceleration) {
            let residual = filter.process(a);
            sum_sq += residual * residual;
        }
        Sample::new(measurement.timestamp, sum_sq.sqrt())
    }

    /// Clear all per-axis filter state.
    pub fn reset(&mut self) {
        for axis in &mut self.axes {
            axis.reset();
        }
    }
}
