//! Linear resampling of timestamped series
//!
//! Re-grids a time-ordered series onto `num_points` evenly spaced
//! timestamps between the first and last input timestamp, linearly
//! interpolating between bracketing input samples. Endpoints are
//! reproduced exactly.

use crate::types::{Sample, Series};

/// Resample `input` onto a uniform grid of `num_points` samples.
///
/// Degenerate inputs are handled without error: an empty input or a
/// zero point count yields an empty series, a point count equal to the
/// input length copies the input verbatim, a single output point
/// yields the middle input sample, and a zero-duration input repeats
/// its first value across the grid.
pub fn resample_linear(input: &[Sample], num_points: usize) -> Series {
    if input.is_empty() || num_points == 0 {
        return Vec::new();
    }
    if num_points == input.len() {
        return input.to_vec();
    }
    let first = input[0];
    let last = input[input.len() - 1];
    let duration = last.timestamp - first.timestamp;

    if duration <= 0.0 {
        return vec![first; num_points];
    }
    if num_points == 1 {
        return vec![input[(input.len() - 1) / 2]];
    }

    let step = duration / (num_points - 1) as f64;
    let mut out = Vec::with_capacity(num_points);
    out.push(first);
    for i in 1..num_points - 1 {
        let t = first.timestamp + step * i as f64;
        // Index of the first sample strictly past t; its predecessor
        // brackets t from below since t is inside the series span.
        let upper = input.partition_point(|s| s.timestamp <= t);
        let hi = upper.min(input.len() - 1);
        let lo = hi - 1;
        let span = input[hi].timestamp - input[lo].timestamp;
        let value = if span > 0.0 {
            let frac = (t - input[lo].timestamp) / span;
            input[lo].value + frac * (input[hi].value - input[lo].value)
        } else {
            input[lo].value
        };
        out.push(Sample {
            timestamp: t,
            value,
        });
    }
    out.push(last);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(points: &[(f64, f64)]) -> Series {
        points
            .iter()
            .map(|&(timestamp, value)| Sample { timestamp, value })
            .collect()
    }

    #[test]
    fn test_empty_input_or_zero_points() {
        assert!(resample_linear(&[], 10).is_empty());
        let s = series(&[(0.0, 1.0), (1.0, 2.0)]);
        assert!(resample_linear(&s, 0).is_empty());
    }

    #[test]
    fn test_matching_count_copies_input() {
        let s = series(&[(0.0, 1.0), (0.4, 3.0), (2.0, -2.0)]);
        assert_eq!(resample_linear(&s, 3), s);
    }

    #[test]
    fn test_single_point_returns_middle_sample() {
        let s = series(&[(0.0, 1.0), (1.0, 5.0), (2.0, 9.0)]);
        let out = resample_linear(&s, 1);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].value, 5.0);
    }

    #[test]
    fn test_zero_duration_repeats_value() {
        let s = series(&[(3.0, 7.0), (3.0, 9.0)]);
        let out = resample_linear(&s, 4);
        assert_eq!(out.len(), 4);
        for sample in &out {
            assert_relative_eq!(sample.value, 7.0);
            assert_relative_eq!(sample.timestamp, 3.0);
        }
    }

    #[test]
    fn test_endpoints_exact() {
        let s = series(&[(0.0, -1.0), (0.7, 3.0), (2.0, 10.0)]);
        let out = resample_linear(&s, 5);
        assert_eq!(out[0], s[0]);
        assert_eq!(out[4], s[2]);
    }

    #[test]
    fn test_linear_ramp_interpolates_exactly() {
        // value = 2t over a non-uniform grid.
        let s = series(&[(0.0, 0.0), (0.3, 0.6), (1.0, 2.0), (2.0, 4.0)]);
        let out = resample_linear(&s, 9);
        for sample in &out {
            assert_relative_eq!(sample.value, 2.0 * sample.timestamp, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_upsampling_grid_spacing() {
        let s = series(&[(0.0, 0.0), (1.0, 1.0)]);
        let out = resample_linear(&s, 11);
        for (i, sample) in out.iter().enumerate() {
            assert_relative_eq!(sample.timestamp, 0.1 * i as f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_repeated_interior_timestamp() {
        // Two samples at the same instant: interpolation falls back to
        // the earlier value instead of dividing by zero.
        let s = series(&[(0.0, 0.0), (1.0, 2.0), (1.0, 8.0), (2.0, 4.0)]);
        let out = resample_linear(&s, 5);
        assert!(out.iter().all(|s| s.value.is_finite()));
    }
}
