//! Percentile estimation by quickselect
//!
//! Selects order statistics in expected O(n) without a full sort. The
//! input slice is partially reordered in place; callers that need the
//! original ordering must copy first.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::stats::percentile::{percentile, RankMethod};
//!
//! let mut data = vec![5.0, 1.0, 4.0, 2.0, 3.0];
//! let median = percentile(&mut data, 0.5, RankMethod::NearestRank).unwrap();
//! assert_eq!(median, 3.0);
//! ```

use crate::types::{DspError, DspResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How a fractional percentile maps onto a discrete rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RankMethod {
    /// ceil(p·n) - 1, clamped to the valid range.
    #[default]
    NearestRank,
    /// floor(p·(n-1)), clamped to the valid range.
    Lower,
}

impl RankMethod {
    fn index(self, p: f64, n: usize) -> usize {
        let raw = match self {
            Self::NearestRank => (p * n as f64).ceil() - 1.0,
            Self::Lower => (p * (n - 1) as f64).floor(),
        };
        (raw.max(0.0) as usize).min(n - 1)
    }
}

/// Percentile of `data` for `p` in [0, 1], reordering the slice.
///
/// Uses a randomized pivot from a fixed-seed generator, so results are
/// reproducible across runs.
pub fn percentile(data: &mut [f64], p: f64, method: RankMethod) -> DspResult<f64> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    percentile_with_rng(data, p, method, &mut rng)
}

/// Percentile with a caller-supplied pivot generator.
pub fn percentile_with_rng<R: Rng + ?Sized>(
    data: &mut [f64],
    p: f64,
    method: RankMethod,
    rng: &mut R,
) -> DspResult<f64> {
    if data.is_empty() {
        return Err(DspError::EmptyInput("percentile data"));
    }
    let k = method.index(p, data.len());
    Ok(quickselect(data, k, rng))
}

/// Iterative quickselect with Lomuto partitioning.
fn quickselect<R: Rng + ?Sized>(data: &mut [f64], k: usize, rng: &mut R) -> f64 {
    let mut lo = 0;
    let mut hi = data.len() - 1;
    loop {
        if lo == hi {
            return data[lo];
        }
        let pivot = partition(data, lo, hi, rng.random_range(lo..=hi));
        match k.cmp(&pivot) {
            std::cmp::Ordering::Equal => return data[pivot],
            std::cmp::Ordering::Less => hi = pivot - 1,
            std::cmp::Ordering::Greater => lo = pivot + 1,
        }
    }
}

fn partition(data: &mut [f64], lo: usize, hi: usize, pivot_index: usize) -> usize {
    data.swap(pivot_index, hi);
    let pivot = data[hi];
    let mut store = lo;
    for i in lo..hi {
        if data[i] < pivot {
            data.swap(store, i);
            store += 1;
        }
    }
    data.swap(store, hi);
    store
}
