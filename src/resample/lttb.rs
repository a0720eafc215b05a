//! Largest-Triangle-Three-Buckets downsampling
//!
//! Visual downsampling for plotting: keeps the first and last samples
//! verbatim and, for each of the remaining buckets, the sample forming
//! the largest triangle with the previously kept point and the centroid
//! of the next bucket. Peaks and troughs survive aggressive reduction
//! far better than with averaging.

use crate::types::{Sample, Series};

/// Downsample `input` to at most `threshold` points.
///
/// Returns the input unchanged when `threshold` is at least the input
/// length, or below 3 (the algorithm needs a first point, a last point,
/// and at least one bucket).
pub fn downsample_lttb(input: &[Sample], threshold: usize) -> Series {
    if threshold >= input.len() || threshold < 3 {
        return input.to_vec();
    }

    let mut out = Vec::with_capacity(threshold);
    out.push(input[0]);

    let buckets = threshold - 2;
    // Interior samples, split into `buckets` even ranges.
    let span = (input.len() - 2) as f64 / buckets as f64;
    let mut selected = input[0];

    for b in 0..buckets {
        let start = (b as f64 * span) as usize + 1;
        let end = (((b + 1) as f64 * span) as usize + 1).min(input.len() - 1);

        // Centroid of the following bucket (the last sample for the
        // final bucket).
        let next_start = end;
        let next_end = ((((b + 2) as f64 * span) as usize + 1).min(input.len() - 1))
            .max(next_start + 1)
            .min(input.len());
        let n_next = (next_end - next_start) as f64;
        let (mut ct, mut cv) = (0.0, 0.0);
        for s in &input[next_start..next_end] {
            ct += s.timestamp;
            cv += s.value;
        }
        ct /= n_next;
        cv /= n_next;

        let mut best_area = -1.0;
        let mut best = input[start];
        for s in &input[start..end] {
            // Twice the triangle area by the shoelace formula.
            let area = ((selected.timestamp - ct) * (s.value - selected.value)
                - (selected.timestamp - s.timestamp) * (cv - selected.value))
                .abs();
            if area > best_area {
                best_area = area;
                best = *s;
            }
        }
        out.push(best);
        selected = best;
    }

    out.push(input[input.len() - 1]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Series {
        (0..n)
            .map(|i| Sample {
                timestamp: i as f64,
                value: i as f64 * 0.5,
            })
            .collect()
    }

    #[test]
    fn test_no_op_when_threshold_covers_input() {
        let s = ramp(10);
        assert_eq!(downsample_lttb(&s, 10), s);
        assert_eq!(downsample_lttb(&s, 100), s);
    }

    #[test]
    fn test_no_op_when_threshold_below_three() {
        let s = ramp(10);
        assert_eq!(downsample_lttb(&s, 2), s);
        assert_eq!(downsample_lttb(&s, 0), s);
    }

    #[test]
    fn test_output_length_matches_threshold() {
        let s = ramp(1000);
        for &t in &[3, 10, 117, 500] {
            assert_eq!(downsample_lttb(&s, t).len(), t);
        }
    }

    #[test]
    fn test_first_and_last_kept_verbatim() {
        let s = ramp(500);
        let out = downsample_lttb(&s, 20);
        assert_eq!(out[0], s[0]);
        assert_eq!(out[19], s[499]);
    }

    #[test]
    fn test_spike_survives_downsampling() {
        let mut s = ramp(1000);
        s[700].value = 1e6;
        let out = downsample_lttb(&s, 50);
        assert!(out.iter().any(|sample| sample.value == 1e6));
    }

    #[test]
    fn test_timestamps_stay_monotonic() {
        let s: Series = (0..2000)
            .map(|i| Sample {
                timestamp: i as f64 * 0.004,
                value: (i as f64 * 0.1).sin(),
            })
            .collect();
        let out = downsample_lttb(&s, 100);
        for pair in out.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
    }
}
