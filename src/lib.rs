//! # psg-dsp
//!
//! Signal processing for physiological sensor recording: filtering,
//! resampling, streaming statistics, and derived channels for
//! polysomnography-style multi-channel capture.
//!
//! ## Layout
//!
//! - [`types`]: timestamped samples, series, the shared error taxonomy
//! - [`measurement`]: raw sensor measurement records
//! - [`filters`]: FIR/IIR design (windowed-sinc, biquad cascades) and
//!   streaming engines
//! - [`resample`]: linear re-gridding, LTTB plot decimation, polyphase
//!   rational-rate conversion
//! - [`stats`]: quickselect percentiles and the KLL quantile sketch
//! - [`derive`]: HRV, body position, and movement processors
//! - [`ring_buffer`] / [`channel`]: bounded buffering and epoch
//!   extraction for the recording path
//! - [`config`] / [`logging`]: serde configuration and `tracing` setup
//!
//! Design functions are pure and return plain coefficient values;
//! engines and derivation processors hold mutable state and process one
//! sample or chunk at a time, so a pipeline is built by composing them
//! in ordinary synchronous code.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::filters::{calc_cascade, CascadeParams, IirFilter};
//!
//! let stages = calc_cascade(&CascadeParams {
//!     fs: 250.0,
//!     fc: 35.0,
//!     order: 2,
//!     ..Default::default()
//! })
//! .unwrap();
//! let mut eeg_lowpass = IirFilter::new(stages).unwrap();
//! let filtered = eeg_lowpass.process_block(&[0.1, 0.4, -0.2, 0.0]);
//! assert_eq!(filtered.len(), 4);
//! ```

pub mod channel;
pub mod config;
pub mod derive;
pub mod filters;
pub mod logging;
pub mod measurement;
pub mod resample;
pub mod ring_buffer;
pub mod stats;
pub mod types;

pub use channel::{ChannelBuffer, EpochRecord};
pub use config::PipelineConfig;
pub use derive::{BodyPositionProcessor, HrvOutput, HrvProcessor, MovementProcessor};
pub use filters::{FirFilter, IirFilter};
pub use logging::{init_logging, LogConfig};
pub use resample::{downsample_lttb, resample_linear, PolyphaseResampler};
pub use ring_buffer::RingBuffer;
pub use stats::KllSketch;
pub use types::{DspError, DspResult, Sample, Series};
