//! Sample-rate conversion and plot decimation
//!
//! - [`linear`]: interpolate a series onto a uniform time grid
//! - [`lttb`]: visual downsampling that preserves extrema
//! - [`polyphase`]: streaming rational-rate conversion with a
//!   Kaiser-windowed anti-aliasing prototype
//!
//! Linear and LTTB are batch operations on a whole series; the
//! polyphase resampler is stateful and meant to be fed chunk by chunk.

pub mod linear;
pub mod lttb;
pub mod polyphase;

pub use linear::resample_linear;
pub use lttb::downsample_lttb;
pub use polyphase::PolyphaseResampler;
