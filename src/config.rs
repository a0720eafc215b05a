//! Pipeline configuration
//!
//! Serde-backed configuration for the processing pipeline. Every knob
//! has a sensible default so a config file only needs to mention what
//! it changes; an empty JSON object deserializes to the full default
//! pipeline.

use crate::derive::hrv::DEFAULT_WINDOW;
use crate::derive::movement::DEFAULT_CUTOFF_HZ;
use crate::stats::kll::{DEFAULT_C, DEFAULT_K};
use serde::{Deserialize, Serialize};

/// Heart-rate variability derivation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HrvConfig {
    /// Sliding window of accepted RR intervals.
    pub window_size: usize,
}

impl Default for HrvConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW,
        }
    }
}

/// Movement magnitude derivation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementConfig {
    /// Accelerometer sample rate in Hz.
    pub sample_rate: f64,
    /// Gravity-rejection highpass corner in Hz.
    pub cutoff_hz: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            sample_rate: 50.0,
            cutoff_hz: DEFAULT_CUTOFF_HZ,
        }
    }
}

/// Rational resampler settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResamplerConfig {
    /// Target output rate in Hz.
    pub output_rate: f64,
    /// Filter taps per polyphase branch.
    pub taps_per_phase: usize,
    /// Prototype stopband attenuation in dB.
    pub attenuation_db: f64,
}

impl Default for ResamplerConfig {
    fn default() -> Self {
        Self {
            output_rate: 100.0,
            taps_per_phase: 16,
            attenuation_db: crate::resample::polyphase::DEFAULT_ATTENUATION_DB,
        }
    }
}

/// Quantile sketch settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KllConfig {
    /// Top-level capacity.
    pub k: usize,
    /// Geometric capacity decay per level (clamped at construction).
    pub c: f64,
    /// Compact every over-capacity level on each update instead of one
    /// sweep.
    pub eager_compaction: bool,
}

impl Default for KllConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            c: DEFAULT_C,
            eager_compaction: false,
        }
    }
}

/// Per-channel buffering and display settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelConfig {
    /// Ring capacity in samples.
    pub buffer_capacity: usize,
    /// Channel sample rate in Hz.
    pub sample_rate: f64,
    /// Epoch duration for recording pages, in milliseconds.
    pub epoch_ms: f64,
    /// Point budget for plot decimation.
    pub plot_budget: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 250 * 60 * 10,
            sample_rate: 250.0,
            epoch_ms: 30_000.0,
            plot_budget: crate::channel::PLOT_BUDGET,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub channel: ChannelConfig,
    pub hrv: HrvConfig,
    pub movement: MovementConfig,
    pub resampler: ResamplerConfig,
    pub kll: KllConfig,
}
