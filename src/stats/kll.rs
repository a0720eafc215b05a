//! KLL streaming quantile sketch
//!
//! Approximates quantiles of an unbounded stream in bounded memory.
//! Items land in a level-0 buffer; when a level fills, it is sorted and
//! every other survivor is promoted one level up, doubling its weight.
//! Level capacities shrink geometrically below the top, so total memory
//! stays near k while rank error stays within the KLL bounds.
//!
//! Non-finite updates are dropped so a sensor glitch cannot poison the
//! summary.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::stats::KllSketch;
//!
//! let mut sketch = KllSketch::new(256).unwrap();
//! for i in 0..10_000 {
//!     sketch.update(i as f64);
//! }
//! let median = sketch.quantile(0.5);
//! assert!((median - 5_000.0).abs() < 500.0);
//! ```

use crate::types::{DspError, DspResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest accepted k.
pub const MIN_K: usize = 8;
/// Default top-level capacity.
pub const DEFAULT_K: usize = 256;
/// Default geometric capacity decay per level below the top.
pub const DEFAULT_C: f64 = 2.0 / 3.0;

/// Streaming quantile sketch.
#[derive(Debug, Clone)]
pub struct KllSketch {
    k: usize,
    c: f64,
    eager_compaction: bool,
    levels: Vec<Vec<f64>>,
    count: u64,
    min: f64,
    max: f64,
    rng: StdRng,
}

impl Default for KllSketch {
    fn default() -> Self {
        Self::with_options(DEFAULT_K, DEFAULT_C, false)
            .unwrap_or_else(|_| unreachable!("default parameters are valid"))
    }
}

impl KllSketch {
    /// Sketch with top-level capacity `k` (at least [`MIN_K`]).
    pub fn new(k: usize) -> DspResult<Self> {
        Self::with_options(k, DEFAULT_C, false)
    }

    /// Sketch with explicit decay factor and compaction policy. `c` is
    /// clamped into (0.51, 0.95); values outside that range break the
    /// sketch's error guarantees.
    pub fn with_options(k: usize, c: f64, eager_compaction: bool) -> DspResult<Self> {
        if k < MIN_K {
            return Err(DspError::InvalidCapacity(k));
        }
        Ok(Self {
            k,
            c: c.clamp(0.51, 0.95),
            eager_compaction,
            levels: vec![Vec::new()],
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            rng: StdRng::seed_from_u64(0x6b6c6c),
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    /// Number of finite items absorbed.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Items currently retained across all levels.
    pub fn retained(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// Absorb one value. Non-finite values are ignored.
    pub fn update(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.levels[0].push(value);
        self.compress();
    }

    /// Absorb a slice of values.
    pub fn update_all(&mut self, values: &[f64]) {
        for &v in values {
            self.update(v);
        }
    }

    /// Approximate quantile for `p` in [0, 1]. Returns NaN on an empty
    /// sketch; p at the boundaries returns the exact minimum/maximum.
    pub fn quantile(&self, p: f64) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        if p <= 0.0 {
            return self.min;
        }
        if p >= 1.0 {
            return self.max;
        }

        let mut weighted: Vec<(f64, u64)> = Vec::with_capacity(self.retained());
        for (h, level) in self.levels.iter().enumerate() {
            let weight = 1u64 << h;
            weighted.extend(level.iter().map(|&v| (v, weight)));
        }
        weighted.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Each representative covers a run of `weight` ranks; its center
        // sits half a weight past the ranks before it. Interpolating
        // between centers keeps the estimate continuous in p.
        let total: u64 = weighted.iter().map(|&(_, w)| w).sum();
        let target = p * (total as f64 - 1.0);
        let mut cumulative = 0u64;
        let mut prev: Option<(f64, f64)> = None;
        for &(value, weight) in &weighted {
            let center = cumulative as f64 + weight as f64 / 2.0;
            if center >= target {
                return match prev {
                    Some((prev_center, prev_value)) => {
                        let t = (target - prev_center) / (center - prev_center);
                        prev_value + t * (value - prev_value)
                    }
                    None => value,
                };
            }
            cumulative += weight;
            prev = Some((center, value));
        }
        self.max
    }

    /// Exact minimum of the stream (NaN when empty).
    pub fn min(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.min
        }
    }

    /// Exact maximum of the stream (NaN when empty).
    pub fn max(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.max
        }
    }

    /// Capacity of level `h`: k at the top, decaying by c per level
    /// below, floored to an even number of at least 2.
    fn capacity_at(&self, h: usize) -> usize {
        let top = self.levels.len() - 1;
        let cap = self.k as f64 * self.c.powi((top - h) as i32);
        ((cap as usize) & !1).max(2)
    }

    fn compress(&mut self) {
        loop {
            let mut compacted = false;
            let mut h = 0;
            while h < self.levels.len() {
                if self.levels[h].len() >= self.capacity_at(h) {
                    self.compact_level(h);
                    compacted = true;
                }
                h += 1;
            }
            if !compacted || !self.eager_compaction {
                break;
            }
        }
    }

    /// Sort level `h`, drop one end at random when the length is odd,
    /// then promote a random half of the remaining pairs to level h+1.
    fn compact_level(&mut self, h: usize) {
        if h + 1 == self.levels.len() {
            self.levels.push(Vec::new());
        }
        let mut items = std::mem::take(&mut self.levels[h]);
        items.sort_by(f64::total_cmp);
        if items.len() % 2 == 1 {
            if self.rng.random_bool(0.5) {
                items.remove(0);
            } else {
                items.pop();
            }
        }
        let offset = usize::from(self.rng.random_bool(0.5));
        let promoted: Vec<f64> = items.into_iter().skip(offset).step_by(2).collect();
        self.levels[h + 1].extend(promoted);
    }
}
