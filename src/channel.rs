//! Bounded channel buffer for recording and display
//!
//! Each sensor channel keeps its recent history in a fixed-capacity
//! ring. The buffer serves three consumers: epoch extraction for the
//! recording writer (fixed-duration pages, resampled to the page grid,
//! zero-filled where an epoch holds no samples), decimated series for
//! plotting, and percentile-based autoscaling for display ranges.

use crate::resample::{downsample_lttb, resample_linear};
use crate::ring_buffer::RingBuffer;
use crate::stats::{percentile, RankMethod};
use crate::types::{DspError, DspResult, Sample, Series};

/// Point budget handed to the plot decimator.
pub const PLOT_BUDGET: usize = 4000;

/// Percentiles used for display autoscaling. Trimming the extreme 1%
/// keeps a single electrode pop from flattening the trace.
pub const AUTOSCALE_LOW: f64 = 0.01;
pub const AUTOSCALE_HIGH: f64 = 0.99;

/// One fixed-duration page of channel data.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochRecord {
    /// Epoch start in epoch milliseconds (aligned to the epoch grid).
    pub start_timestamp: f64,
    /// Exactly `epoch_duration * sample_rate` values; all zero when
    /// the epoch held no samples.
    pub values: Vec<f64>,
}

/// Fixed-capacity sample history for one channel.
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    samples: RingBuffer<Sample>,
    sample_rate: f64,
}

impl ChannelBuffer {
    /// Buffer holding up to `capacity` samples at `sample_rate` Hz.
    pub fn new(capacity: usize, sample_rate: f64) -> DspResult<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(DspError::InvalidRate(sample_rate));
        }
        Ok(Self {
            samples: RingBuffer::new(capacity)?,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append one sample, evicting the oldest when full.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Append a slice of samples.
    pub fn extend(&mut self, samples: &[Sample]) {
        for &s in samples {
            self.samples.push(s);
        }
    }

    /// Buffered samples in arrival order.
    pub fn to_series(&self) -> Series {
        self.samples.to_vec()
    }

    /// Drop all buffered samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Buffered history decimated to the default plot budget.
    pub fn plot_series(&self) -> Series {
        self.plot_series_with_budget(PLOT_BUDGET)
    }

    /// Buffered history decimated to at most `budget` points.
    pub fn plot_series_with_budget(&self, budget: usize) -> Series {
        downsample_lttb(&self.samples.to_vec(), budget)
    }

    /// (low, high) display range from the 1st and 99th percentile of
    /// buffered values. `None` when empty.
    pub fn autoscale_range(&self) -> Option<(f64, f64)> {
        let mut values: Vec<f64> = self.samples.iter().map(|s| s.value).collect();
        let low = percentile(&mut values, AUTOSCALE_LOW, RankMethod::Lower).ok()?;
        let high = percentile(&mut values, AUTOSCALE_HIGH, RankMethod::Lower).ok()?;
        Some((low, high))
    }

    /// Split buffered samples into fixed-duration epochs aligned to an
    /// absolute grid (epoch index = floor(timestamp / duration)). Every
    /// record carries exactly `epoch_ms / 1000 * sample_rate` values:
    /// the epoch's samples linearly resampled onto that grid, or all
    /// zero when the epoch holds no samples. Epochs between the first
    /// and last buffered sample are emitted even when empty, so a
    /// dropout surfaces as a flat-line page instead of a missing one.
    pub fn epoch_records(&self, epoch_ms: f64) -> Vec<EpochRecord> {
        if self.samples.is_empty() || !(epoch_ms.is_finite() && epoch_ms > 0.0) {
            return Vec::new();
        }
        let slots = ((epoch_ms / 1000.0) * self.sample_rate).round().max(1.0) as usize;
        let series = self.samples.to_vec();
        let first_index = (series[0].timestamp / epoch_ms).floor() as i64;
        let last_index = (series[series.len() - 1].timestamp / epoch_ms).floor() as i64;

        let mut records = Vec::with_capacity((last_index - first_index + 1) as usize);
        let mut cursor = 0;
        for index in first_index..=last_index {
            let start = index as f64 * epoch_ms;
            let end = start + epoch_ms;
            let begin = cursor;
            while cursor < series.len() && series[cursor].timestamp < end {
                cursor += 1;
            }
            let window = &series[begin..cursor];
            let values = if window.is_empty() {
                vec![0.0; slots]
            } else {
                resample_linear(window, slots)
                    .into_iter()
                    .map(|s| s.value)
                    .collect()
            };
            records.push(EpochRecord {
                start_timestamp: start,
                values,
            });
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn filled(capacity: usize, rate: f64, n: usize) -> ChannelBuffer {
        let mut buf = ChannelBuffer::new(capacity, rate).unwrap();
        for i in 0..n {
            buf.push(Sample::new(i as f64 * 1000.0 / rate, i as f64));
        }
        buf
    }

    #[test]
    fn test_invalid_rate_rejected() {
        assert!(ChannelBuffer::new(100, 0.0).is_err());
        assert!(ChannelBuffer::new(100, f64::NAN).is_err());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let buf = filled(10, 10.0, 25);
        assert_eq!(buf.len(), 10);
        assert_relative_eq!(buf.to_series()[0].value, 15.0);
    }

    #[test]
    fn test_plot_series_respects_budget() {
        let buf = filled(10_000, 100.0, 10_000);
        assert_eq!(buf.plot_series().len(), 4000);
        assert_eq!(buf.plot_series_with_budget(100).len(), 100);
        // Under budget: returned verbatim.
        let small = filled(100, 100.0, 50);
        assert_eq!(small.plot_series().len(), 50);
    }

    #[test]
    fn test_autoscale_trims_outliers()  {
        let mut buf = ChannelBuffer::new(1000, 100.0).unwrap();
        for i in 0..1000 {
            buf.push(Sample::new(i as f64 * 10.0, (i % 100) as f64));
        }
        buf.push(Sample::new(10_000.0, 1e9));
        let (low, high) = buf.autoscale_range().unwrap();
        assert!(low <= 1.0);
        assert!(high < 100.0, "outlier must not stretch the range: {high}");
    }

    #[test]
    fn test_autoscale_empty_is_none() {
        let buf = ChannelBuffer::new(10, 100.0).unwrap();
        assert!(buf.autoscale_range().is_none());
    }

    #[test]
    fn test_epoch_records_fixed_length() {
        // 10 Hz, 30 s epochs: 300 slots each.
        let buf = filled(1000, 10.0, 700);
        let records = buf.epoch_records(30_000.0);
        assert_eq!(records.len(), 3);
        for r in &records {
            assert_eq!(r.values.len(), 300);
        }
        assert_relative_eq!(records[0].start_timestamp, 0.0);
        assert_relative_eq!(records[1].start_timestamp, 30_000.0);
    }

    #[test]
    fn test_sparse_epoch_stretched_by_resampling() {
        let mut buf = ChannelBuffer::new(100, 10.0).unwrap();
        buf.push(Sample::new(0.0, 5.0));
        buf.push(Sample::new(2000.0, 7.0));
        let records = buf.epoch_records(30_000.0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values.len(), 300);
        // Two samples stretch into a ramp across the page.
        assert_relative_eq!(records[0].values[0], 5.0);
        assert_relative_eq!(records[0].values[299], 7.0);
        let mid = records[0].values[150];
        assert!((5.0..=7.0).contains(&mid));
    }

    #[test]
    fn test_empty_epoch_between_samples_zero_filled() {
        let mut buf = ChannelBuffer::new(100, 10.0).unwrap();
        buf.push(Sample::new(1_000.0, 3.0));
        // Next sample two epochs later: the epoch between is emitted
        // as a flat-line page.
        buf.push(Sample::new(61_000.0, 4.0));
        let records = buf.epoch_records(30_000.0);
        assert_eq!(records.len(), 3);
        assert_relative_eq!(records[1].start_timestamp, 30_000.0);
        assert!(records[1].values.iter().all(|&v| v == 0.0));
        assert!(records[0].values.iter().all(|&v| v == 3.0));
        assert!(records[2].values.iter().all(|&v| v == 4.0));
    }

    #[test]
    fn test_epoch_alignment_to_grid() {
        let mut buf = ChannelBuffer::new(100, 10.0).unwrap();
        // First sample mid-epoch: the record still starts on the grid.
        buf.push(Sample::new(45_000.0, 1.0));
        let records = buf.epoch_records(30_000.0);
        assert_eq!(records.len(), 1);
        assert_relative_eq!(records[0].start_timestamp, 30_000.0);
        assert!(records[0].values.iter().all(|&v| v == 1.0));
    }
}
