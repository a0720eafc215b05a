//! Streaming and batch statistics
//!
//! - [`percentile`]: quickselect order statistics over a batch
//! - [`kll`]: bounded-memory streaming quantile sketch

pub mod kll;
pub mod percentile;

pub use kll::KllSketch;
pub use percentile::{percentile, percentile_with_rng, RankMethod};
